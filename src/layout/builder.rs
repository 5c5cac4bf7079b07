// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde_json::Map;
use serde_json::Value;

/// An insertion-ordered JSON object.
///
/// Adding a key that is already present replaces its value and keeps its original position.
#[derive(Debug, Default)]
pub(crate) struct ObjectBuilder {
    map: Map<String, Value>,
}

impl ObjectBuilder {
    pub(crate) fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key.into(), value.into());
        self
    }

    pub(crate) fn build(self) -> Value {
        Value::Object(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut builder = ObjectBuilder::default();
        builder.add("z", 1).add("a", "x").add("m", true);
        assert_eq!(builder.build().to_string(), r#"{"z":1,"a":"x","m":true}"#);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut builder = ObjectBuilder::default();
        builder.add("first", 1).add("second", 2).add("first", "again");
        assert_eq!(
            builder.build().to_string(),
            r#"{"first":"again","second":2}"#
        );
    }
}
