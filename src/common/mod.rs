pub mod io;

/// Restore the default SIGPIPE disposition so that writing into a closed
/// pipe (e.g. `fpar | head`) terminates the process silently instead of
/// surfacing a broken-pipe error.
#[cfg(unix)]
pub fn reset_sigpipe() {
    // SAFETY: installing SIG_DFL for SIGPIPE has no preconditions.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
pub fn reset_sigpipe() {}

/// Render an io::Error the way GNU tools print it: the strerror text
/// without Rust's " (os error N)" suffix.
pub fn io_error_msg(e: &std::io::Error) -> String {
    let msg = e.to_string();
    match msg.find(" (os error") {
        Some(pos) => msg[..pos].to_string(),
        None => msg,
    }
}
