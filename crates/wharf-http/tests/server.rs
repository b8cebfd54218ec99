//! End-to-end server tests over real sockets.
//!
//! A server runs on its own thread inside an asupersync runtime while
//! the test drives it with a blocking std `TcpStream`, including
//! fragmented writes that straddle the header/body boundary.

use asupersync::runtime::RuntimeBuilder;
use std::future::Future;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;
use wharf_core::{Request, RequestContext, Response};
use wharf_http::{ServerConfig, TcpServer};

fn spawn_server<H, Fut>(server: Arc<TcpServer>, handler: H) -> (SocketAddr, JoinHandle<()>)
where
    H: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();

    let thread = std::thread::spawn(move || {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("test runtime must build");
        rt.block_on(async move {
            let cx = asupersync::Cx::for_testing();
            let listener = asupersync::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind must succeed");
            let local_addr = listener.local_addr().expect("local_addr must work");
            addr_tx.send(local_addr).expect("addr send must succeed");

            let _ = server.serve_on(&cx, listener, handler).await;
        });
    });

    let addr = addr_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("server must report addr");
    (addr, thread)
}

fn stop_server(server: &TcpServer, addr: SocketAddr, thread: JoinHandle<()>) {
    // Stop the accept loop and wake a pending accept with a dummy
    // connection that is immediately closed.
    server.shutdown();
    drop(TcpStream::connect(addr));
    thread.join().expect("server thread join");
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("set read timeout");
    stream
        .set_write_timeout(Some(Duration::from_secs(2)))
        .expect("set write timeout");
    stream
}

fn read_to_end(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).expect("read to end");
    buf
}

/// Read exactly one response: headers, then Content-Length body bytes.
fn read_one_response(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut tmp).expect("read must succeed");
        assert!(n > 0, "connection closed mid-response");
        buf.extend_from_slice(&tmp[..n]);
    };

    let headers = std::str::from_utf8(&buf[..header_end]).expect("utf8 headers");
    let content_length: usize = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().expect("numeric content-length"))
        })
        .expect("response must carry content-length");

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).expect("read must succeed");
        assert!(n > 0, "connection closed mid-body");
        buf.extend_from_slice(&tmp[..n]);
    }

    String::from_utf8(buf).expect("utf8 response")
}

async fn echo_handler(_ctx: RequestContext, request: Request) -> Response {
    if !request.is_valid() {
        return Response::bad_request();
    }
    Response::ok().body(format!("{} {}", request.method(), request.resource()))
}

#[test]
fn get_request_round_trip() {
    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), echo_handler);

    let mut stream = connect(addr);
    stream
        .write_all(b"GET /hello HTTP/1.0\r\n\r\n")
        .expect("write request");

    let response = String::from_utf8(read_to_end(&mut stream)).expect("utf8 response");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.ends_with("GET /hello"), "{response}");

    stop_server(&server, addr, thread);
}

#[test]
fn malformed_request_is_dispatched_invalid() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<bool>::new()));
    let handler = {
        let seen = Arc::clone(&seen);
        move |_ctx: RequestContext, request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(request.is_valid());
                if request.is_valid() {
                    Response::ok()
                } else {
                    Response::bad_request()
                }
            }
        }
    };

    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), handler);

    let mut stream = connect(addr);
    stream
        .write_all(b"BAD(REQUEST / HTTP/1.0\r\n\r\n")
        .expect("write request");

    let response = String::from_utf8(read_to_end(&mut stream)).expect("utf8 response");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert_eq!(*seen.lock(), vec![false]);

    stop_server(&server, addr, thread);
}

#[test]
fn keep_alive_serves_sequential_requests() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
    let handler = {
        let seen = Arc::clone(&seen);
        move |_ctx: RequestContext, request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(request.resource().to_string());
                Response::ok().body(request.resource().to_string())
            }
        }
    };

    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), handler);

    let mut stream = connect(addr);
    stream
        .write_all(b"GET /first HTTP/1.1\r\nHost: x\r\n\r\n")
        .expect("write first");
    let first = read_one_response(&mut stream);
    assert!(first.ends_with("/first"), "{first}");

    stream
        .write_all(b"GET /second HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
        .expect("write second");
    let second = String::from_utf8(read_to_end(&mut stream)).expect("utf8 response");
    assert!(second.ends_with("/second"), "{second}");

    // one dispatch per request, in order
    assert_eq!(*seen.lock(), vec!["/first".to_string(), "/second".to_string()]);

    stop_server(&server, addr, thread);
}

#[test]
fn pipelined_second_request_is_served_from_leftover() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
    let handler = {
        let seen = Arc::clone(&seen);
        move |_ctx: RequestContext, request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(request.resource().to_string());
                Response::ok().body(request.resource().to_string())
            }
        }
    };

    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), handler);

    let mut stream = connect(addr);
    // Both requests in one write: the second must be parsed from the
    // bytes read past the first.
    stream
        .write_all(
            b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
        )
        .expect("write pipelined requests");

    let both = String::from_utf8(read_to_end(&mut stream)).expect("utf8 responses");
    let responses: Vec<_> = both.matches("HTTP/1.1 200 OK").collect();
    assert_eq!(responses.len(), 2, "{both}");
    assert_eq!(*seen.lock(), vec!["/a".to_string(), "/b".to_string()]);

    stop_server(&server, addr, thread);
}

#[test]
fn fragmented_post_straddling_header_and_body() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<Vec<u8>>::new()));
    let handler = {
        let seen = Arc::clone(&seen);
        move |_ctx: RequestContext, request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(request.body().to_vec());
                Response::ok().body("done")
            }
        }
    };

    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), handler);

    let mut stream = connect(addr);
    // First write ends mid-header; second delivers the rest of the
    // headers plus a body prefix; the tail arrives separately.
    stream
        .write_all(b"POST /upload HTTP/1.0\r\nContent-Ty")
        .expect("write fragment 1");
    std::thread::sleep(Duration::from_millis(50));
    stream
        .write_all(b"pe: text/plain\r\nContent-Length: 11\r\n\r\nhello")
        .expect("write fragment 2");
    std::thread::sleep(Duration::from_millis(50));
    stream.write_all(b" world").expect("write fragment 3");

    let response = String::from_utf8(read_to_end(&mut stream)).expect("utf8 response");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(*seen.lock(), vec![b"hello world".to_vec()]);

    stop_server(&server, addr, thread);
}

#[test]
fn form_encoded_post_populates_params() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::<(String, String)>::new()));
    let handler = {
        let seen = Arc::clone(&seen);
        move |_ctx: RequestContext, request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                for (name, value) in request.query_params().iter() {
                    seen.lock().push((name.to_string(), value.to_string()));
                }
                Response::ok()
            }
        }
    };

    let server = Arc::new(TcpServer::new(ServerConfig::new("127.0.0.1:0")));
    let (addr, thread) = spawn_server(Arc::clone(&server), handler);

    let mut stream = connect(addr);
    stream
        .write_all(
            b"POST /f?src=uri HTTP/1.0\r\n\
              Content-Type: application/x-www-form-urlencoded\r\n\
              Content-Length: 7\r\n\r\na=1&b=2",
        )
        .expect("write request");

    let response = String::from_utf8(read_to_end(&mut stream)).expect("utf8 response");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(
        *seen.lock(),
        vec![
            ("src".to_string(), "uri".to_string()),
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
    );

    stop_server(&server, addr, thread);
}
