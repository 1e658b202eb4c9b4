use std::sync::Arc;
use std::sync::Mutex;

/// Exactly-once distribution of a fixed spectrum set across worker
/// threads.
///
/// The item sequence is frozen at construction; `next` hands out each
/// spectrum to exactly one caller and answers `None` forever once the
/// sequence is drained. The lock covers only the cursor check-and-increment
/// so workers never serialize on each other's fitting work.
#[derive(Debug)]
pub struct SpectrumWorkQueue {
    items: Vec<Arc<str>>,
    cursor: Mutex<usize>,
}

impl SpectrumWorkQueue {
    pub fn new(items: impl IntoIterator<Item = Arc<str>>) -> Self {
        Self {
            items: items.into_iter().collect(),
            cursor: Mutex::new(0),
        }
    }

    pub fn next(&self) -> Option<Arc<str>> {
        let claimed = {
            let mut cursor = self.cursor.lock().unwrap();
            if *cursor >= self.items.len() {
                return None;
            }
            let ix = *cursor;
            *cursor += 1;
            ix
        };
        Some(self.items[claimed].clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
