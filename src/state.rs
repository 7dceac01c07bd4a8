//! Administrative dim blocking.

use std::sync::Mutex;

/// Counter of external hints that block dimming.
///
/// While the count is nonzero the supervisor leaves the screen at its
/// current level regardless of idle time.
pub struct BlockDim {
    count: Mutex<u32>,
}

impl BlockDim {
    pub fn new() -> Self {
        BlockDim {
            count: Mutex::new(0),
        }
    }

    pub fn count(&self) -> u32 {
        *self.count.lock().unwrap()
    }

    pub fn block(&self) {
        let mut count = self.count.lock().unwrap();
        *count += 1;
    }

    pub fn unblock(&self) {
        let mut count = self.count.lock().unwrap();
        if *count == 0 {
            error!("state: dim-block counter is 0, cannot decrement");
        } else {
            *count -= 1;
        }
    }
}
