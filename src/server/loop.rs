// Server loop module
// Accepts connections until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::{serve_connection, ConnectionContext};
use crate::config::AcceptMode;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_millis(500);

/// Pause after `consecutive_errors` failed accepts in a row, doubling up to a cap
pub fn accept_backoff(consecutive_errors: u32) -> Duration {
    let factor = 1u32 << consecutive_errors.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_MIN.saturating_mul(factor).min(ACCEPT_BACKOFF_MAX)
}

/// Run the accept loop on `listener` until `shutdown` is notified.
///
/// In serial mode each connection is served to completion before the next
/// accept. A shutdown requested meanwhile takes precedence over connections
/// already queued on the listener. The listener is dropped, and the port
/// released, when the loop returns.
pub async fn run_accept_loop(listener: TcpListener, ctx: Arc<ConnectionContext>, shutdown: Arc<Notify>) {
    let mut accept_errors: u32 = 0;
    loop {
        tokio::select! {
            biased;

            () = shutdown.notified() => {
                ctx.logger.debug("Accept loop received shutdown");
                break;
            }

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_errors = 0;
                        ctx.logger.debug(&format!("Accepted connection from {peer_addr}"));
                        match ctx.accept_mode {
                            AcceptMode::Serial => {
                                serve_connection(stream, peer_addr, Arc::clone(&ctx)).await;
                            }
                            AcceptMode::Concurrent => {
                                tokio::spawn(serve_connection(stream, peer_addr, Arc::clone(&ctx)));
                            }
                        }
                    }
                    Err(e) => {
                        accept_errors = accept_errors.saturating_add(1);
                        let pause = accept_backoff(accept_errors);
                        ctx.logger.error(&format!(
                            "Failed to accept connection: {e}, retrying in {}ms",
                            pause.as_millis()
                        ));
                        tokio::time::sleep(pause).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_backoff_doubles_up_to_cap() {
        assert_eq!(accept_backoff(1), Duration::from_millis(10));
        assert_eq!(accept_backoff(2), Duration::from_millis(20));
        assert_eq!(accept_backoff(3), Duration::from_millis(40));
        assert_eq!(accept_backoff(6), Duration::from_millis(320));
        assert_eq!(accept_backoff(7), ACCEPT_BACKOFF_MAX);
        assert_eq!(accept_backoff(u32::MAX), ACCEPT_BACKOFF_MAX);
    }

    #[test]
    fn test_accept_backoff_never_zero() {
        assert_eq!(accept_backoff(0), ACCEPT_BACKOFF_MIN);
    }
}
