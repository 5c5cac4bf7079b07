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

//! Local host name resolution.

use std::sync::OnceLock;

use crate::Error;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// The host name used when the local host name cannot be resolved.
pub const UNKNOWN_HOST: &str = "unknown-host";

/// Returns the local host name, resolved on first use and cached for the process lifetime.
///
/// Concurrent first calls converge on the same value. If resolution fails, the failure is
/// reported to the [`DefaultTrap`] once and [`UNKNOWN_HOST`] is returned from then on.
pub fn host_name() -> &'static str {
    static HOST_NAME: OnceLock<String> = OnceLock::new();
    HOST_NAME.get_or_init(|| resolve_host_name_or_trap(&DefaultTrap::default()))
}

/// Resolves the local host name, reporting a failure to `trap` and degrading to
/// [`UNKNOWN_HOST`].
pub fn resolve_host_name_or_trap(trap: &dyn Trap) -> String {
    match resolve_host_name() {
        Ok(name) => name,
        Err(err) => {
            trap.trap(&err);
            UNKNOWN_HOST.to_string()
        }
    }
}

/// Resolves the local host name.
#[cfg(unix)]
pub fn resolve_host_name() -> Result<String, Error> {
    // 255 bytes is the POSIX limit for host names, plus the trailing NUL
    let mut buf = [0u8; 256];

    // SAFETY: the buffer is valid for `buf.len()` bytes
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if ret != 0 {
        return Err(Error::new("failed to resolve host name")
            .with_source(std::io::Error::last_os_error()));
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    non_empty(String::from_utf8_lossy(&buf[..len]).into_owned())
}

/// Resolves the local host name.
#[cfg(not(unix))]
pub fn resolve_host_name() -> Result<String, Error> {
    match std::env::var("COMPUTERNAME").or_else(|_| std::env::var("HOSTNAME")) {
        Ok(name) => non_empty(name),
        Err(err) => Err(Error::new("failed to resolve host name").with_source(err)),
    }
}

fn non_empty(name: String) -> Result<String, Error> {
    if name.is_empty() {
        Err(Error::new("failed to resolve host name: empty name"))
    } else {
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct CollectingTrap(Mutex<Vec<String>>);

    impl Trap for CollectingTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn test_host_name_is_cached() {
        let first = host_name();
        let second = host_name();
        assert!(!first.is_empty());
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_host_name_concurrent_first_use() {
        let names: Vec<&'static str> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(host_name)).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(names.windows(2).all(|w| std::ptr::eq(w[0], w[1])));
    }

    #[test]
    fn test_resolve_or_trap() {
        let trap = CollectingTrap::default();
        let name = resolve_host_name_or_trap(&trap);
        match resolve_host_name() {
            Ok(expected) => {
                assert_eq!(name, expected);
                assert!(trap.0.lock().unwrap().is_empty());
            }
            Err(_) => {
                assert_eq!(name, UNKNOWN_HOST);
                assert_eq!(trap.0.lock().unwrap().len(), 1);
            }
        }
    }

    #[test]
    fn test_non_empty() {
        assert!(non_empty(String::new()).is_err());
        assert_eq!(non_empty("box".to_string()).unwrap(), "box");
    }
}
