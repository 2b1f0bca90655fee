//! I/O Engine (`spec.md` §5): N single-threaded reactors, each with its own
//! event loop on a dedicated OS thread, all `accept`ing on a socket bound
//! with `SO_REUSEADDR`/`SO_REUSEPORT` so the kernel load-balances incoming
//! connections across them.

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use lobos_http::GatewayService;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};

const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Start `threads` reactors, each bound to `addr`, optionally pinning
/// reactor *i* to CPU *i*. Blocks the calling thread forever (this is
/// `main`'s final call).
pub fn run(addr: SocketAddr, threads: usize, pin_threads: bool, service: GatewayService) {
    let core_ids = pin_threads.then(core_affinity::get_core_ids).flatten();

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let service = service.clone();
            let core_id = core_ids.as_ref().and_then(|ids| ids.get(i).copied());
            std::thread::Builder::new()
                .name(format!("lobos-reactor-{i}"))
                .spawn(move || reactor_main(i, addr, core_id, service))
                .expect("failed to spawn reactor thread")
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
}

fn reactor_main(index: usize, addr: SocketAddr, core_id: Option<core_affinity::CoreId>, service: GatewayService) {
    if let Some(core_id) = core_id {
        core_affinity::set_for_current(core_id);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build reactor runtime");

    runtime.block_on(async move {
        let listener = match bind_reuseport(addr) {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(reactor = index, error = %e, "failed to bind reactor listener");
                return;
            }
        };

        tracing::info!(reactor = index, %addr, "reactor listening");

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(reactor = index, error = %e, "accept failed");
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                tracing::warn!(reactor = index, error = %e, "failed to set TCP_NODELAY");
            }

            let service = service.clone();
            tokio::spawn(async move {
                serve_session(stream, peer, service, index).await;
            });
        }
    });
}

async fn serve_session(stream: TcpStream, peer: SocketAddr, service: GatewayService, reactor: usize) {
    let started = Instant::now();
    let last_activity_millis = Arc::new(AtomicU64::new(0));
    let tracked = ActivityTracked { inner: stream, last_activity_millis: Arc::clone(&last_activity_millis), started };
    let io = TokioIo::new(tracked);
    let conn = auto::Builder::new(TokioExecutor::new()).serve_connection(io, service);
    tokio::pin!(conn);

    // `hyper_util`'s connection future takes ownership of the I/O object for
    // its entire lifetime and does not hand it back on completion, so an
    // explicit half-close (shutdown-write) before drop is not reachable
    // through this API; the OS performs an ordinary close instead. Noted as
    // a deliberate deviation in DESIGN.md.

    // `spec.md` §5: "idle timeout: 30 seconds, reset on each header read."
    // `ActivityTracked` records the time of the connection's last successful
    // socket read; this loop races the connection future against a sleep to
    // that deadline and, each time the sleep fires, checks whether a read
    // has pushed the deadline out further before actually giving up. A
    // connection that is still making read progress (e.g. a large streaming
    // PUT body) never trips this, even if the whole transfer runs well past
    // 30 seconds.
    loop {
        let idle_for = Duration::from_millis(elapsed_millis(started).saturating_sub(last_activity_millis.load(Ordering::Relaxed)));
        let remaining = IDLE_TIMEOUT.saturating_sub(idle_for);

        tokio::select! {
            result = &mut conn => {
                if let Err(e) = result {
                    tracing::debug!(reactor, %peer, error = %e, "connection error");
                }
                return;
            }
            () = tokio::time::sleep(remaining) => {
                let idle_for = Duration::from_millis(elapsed_millis(started).saturating_sub(last_activity_millis.load(Ordering::Relaxed)));
                if idle_for >= IDLE_TIMEOUT {
                    tracing::debug!(reactor, %peer, "connection idle timeout");
                    return;
                }
            }
        }
    }
}

fn elapsed_millis(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Wraps a `TcpStream` and records the time of the last successful read, so
/// `serve_session`'s idle-timeout watchdog can reset its deadline on read
/// progress instead of over the whole connection lifetime.
struct ActivityTracked {
    inner: TcpStream,
    last_activity_millis: Arc<AtomicU64>,
    started: Instant,
}

impl AsyncRead for ActivityTracked {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let result = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(result, Poll::Ready(Ok(()))) && buf.filled().len() > before {
            this.last_activity_millis.store(elapsed_millis(this.started), Ordering::Relaxed);
        }
        result
    }
}

impl AsyncWrite for ActivityTracked {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Bind a `TcpListener` with `SO_REUSEADDR` and `SO_REUSEPORT` set before
/// `bind`, so every reactor can listen on the same address/port and let the
/// kernel distribute incoming connections across them.
fn bind_reuseport(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    TcpListener::from_std(socket.into())
}
