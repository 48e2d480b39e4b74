/*!
Post-startup privilege reduction. Once the score is parsed and the device is
open, the process only needs standard I/O.
!*/

use crate::error::{LibResult, Result};

/// Restrict the process to standard I/O. Uses pledge(2) where the system
/// provides it; elsewhere this is a no-op, since the absence of the facility
/// is not an error. A present facility that fails is fatal.
pub fn limit_to_stdio() -> Result<()> {
    Ok(limit_inner()?)
}

#[cfg(target_os = "openbsd")]
fn limit_inner() -> LibResult<()> {
    use snafu::ResultExt;

    let promises = b"stdio\0";
    let r = unsafe { libc::pledge(promises.as_ptr().cast(), std::ptr::null()) };
    if r == -1 {
        return Err(std::io::Error::last_os_error())
            .context(crate::error::SandboxSnafu { site: site!() });
    }
    Ok(())
}

#[cfg(not(target_os = "openbsd"))]
fn limit_inner() -> LibResult<()> {
    Ok(())
}
