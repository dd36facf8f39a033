use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Canned response served by [`spawn_http_server`].
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub status: u16,
    pub reason: &'static str,
    pub body: &'static str,
    pub location: Option<&'static str>,
    pub delay: Duration,
}

impl Reply {
    pub(crate) const fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            reason: "OK",
            body,
            location: None,
            delay: Duration::ZERO,
        }
    }

    pub(crate) const fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            body: "",
            location: None,
            delay: Duration::ZERO,
        }
    }

    pub(crate) const fn with_location(mut self, location: &'static str) -> Self {
        self.location = Some(location);
        self
    }

    pub(crate) const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn render(&self) -> String {
        let location = self
            .location
            .map(|value| format!("Location: {}\r\n", value))
            .unwrap_or_default();
        format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
            self.status,
            self.reason,
            self.body.len(),
            location,
            self.body
        )
    }
}

/// Threaded HTTP/1.1 server counting every request it answers.
pub(crate) struct TestServer {
    url: String,
    hits: Arc<AtomicU64>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

pub(crate) fn spawn_http_server(reply: Reply) -> Result<TestServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let hits = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let response = Arc::new(reply);
    let server_hits = Arc::clone(&hits);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let response = Arc::clone(&response);
                    let hits = Arc::clone(&server_hits);
                    thread::spawn(move || handle_client(stream, &response, &hits));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok(TestServer {
        url: format!("http://{}/", addr),
        hits,
        shutdown: shutdown_tx,
        thread: Some(handle),
    })
}

/// Returns a URL on which nothing is listening.
pub(crate) fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind probe failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("probe addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}/", addr))
}

fn handle_client(mut stream: TcpStream, reply: &Reply, hits: &AtomicU64) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 4096];
    match stream.read(&mut buffer) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    hits.fetch_add(1, Ordering::SeqCst);
    if !reply.delay.is_zero() {
        thread::sleep(reply.delay);
    }
    if stream.write_all(reply.render().as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}
