use async_channel::{Receiver, Sender};

/// Observed by the follow loop at the top of every poll.
///
/// The token reports cancellation once a value has been sent on its channel or
/// once every sender has been dropped. The channel is never received from, so
/// the signal stays put and every later check (and every clone) still sees it.
#[derive(Clone)]
pub struct CancelToken {
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        !self.rx.is_empty() || self.rx.is_closed()
    }
}

pub fn channel() -> (Sender<()>, CancelToken) {
    let (tx, rx) = async_channel::bounded(1);
    (tx, CancelToken { rx })
}

/// Install a Ctrl-C handler that fires the returned token.
pub fn on_interrupt() -> Result<CancelToken, ctrlc::Error> {
    let (tx, token) = channel();
    ctrlc::set_handler(move || {
        // a full channel means an earlier interrupt is still pending
        let _ = tx.try_send(());
    })?;
    Ok(token)
}
