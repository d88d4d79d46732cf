use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Install a Ctrl+C handler. The first interrupt asks the request loop to
/// stop after the in-flight request; the second aborts the process.
pub fn register() -> Result<Interrupted, ctrlc::Error> {
    let interrupted = Interrupted::new();
    let b = interrupted.clone();
    ctrlc::set_handler(move || {
        if b.interrupted() {
            println!("User requested abort (Ctrl+C twice)");
            std::process::exit(1);
        }
        println!("Stopping after the in-flight request (Ctrl+C again to abort)...");
        b.set();
    })?;
    Ok(interrupted)
}

#[derive(Clone)]
pub struct Interrupted {
    interrupted: Arc<AtomicBool>,
}

impl Interrupted {
    pub fn new() -> Interrupted {
        Interrupted {
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}
