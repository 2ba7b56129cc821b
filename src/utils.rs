use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr::{null, null_mut};

/// Fork off a command, detached from the window manager via setsid. The X
/// connection fd is closed in the child so the command cannot hold it open.
pub fn spawn(argv: &[String], display_fd: Option<c_int>) {
    if argv.is_empty() {
        return;
    }
    let cstrs: Vec<CString> = match argv
        .iter()
        .map(|a| CString::new(a.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(v) => v,
        Err(_) => {
            log::error!("spawn: argument contains NUL: {:?}", argv);
            return;
        }
    };
    let mut ptrs: Vec<*const c_char> = cstrs.iter().map(|c| c.as_ptr()).collect();
    ptrs.push(null());

    unsafe {
        if libc::fork() == 0 {
            if let Some(fd) = display_fd {
                libc::close(fd);
            }
            libc::setsid();
            libc::execvp(ptrs[0], ptrs.as_ptr());
            eprintln!("dwm: execvp {} failed", argv[0]);
            libc::_exit(1);
        }
    }
}

extern "C" fn sigchld(_signal: c_int) {
    unsafe {
        while libc::waitpid(-1, null_mut(), libc::WNOHANG) > 0 {}
    }
}

/// Install the SIGCHLD reaper and clean up any zombies inherited at startup.
pub fn install_sigchld() {
    let handler = sigchld as extern "C" fn(c_int);
    unsafe {
        if libc::signal(libc::SIGCHLD, handler as libc::sighandler_t) == libc::SIG_ERR {
            eprintln!("dwm: can't install SIGCHLD handler");
            std::process::exit(1);
        }
    }
    sigchld(0);
}
