pub fn normalize_exit(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(sig) = status.signal() {
            128 + sig
        } else {
            1
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn signal_maps_above_128() {
        // raw wait status: terminated by SIGKILL (9)
        assert_eq!(normalize_exit(std::process::ExitStatus::from_raw(9)), 137);
        // raw wait status: exited with code 2
        assert_eq!(normalize_exit(std::process::ExitStatus::from_raw(2 << 8)), 2);
    }
}
