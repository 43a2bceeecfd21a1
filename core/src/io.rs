use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Cloneable in-memory output sink.
///
/// Hand one clone to [`AppBuilder::output`](crate::AppBuilder::output) and
/// keep another to inspect what the shell printed.
///
/// ```
/// use std::io::Write;
/// use shellkit_core::SharedBuffer;
///
/// let buf = SharedBuffer::new();
/// let mut writer = buf.clone();
/// write!(writer, "hi").unwrap();
/// assert_eq!(buf.contents(), "hi");
/// buf.clear();
/// assert!(buf.contents().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
