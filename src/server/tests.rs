//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
    use tokio::sync::RwLock;

    use crate::parser::HttpRequest;
    use crate::server::{
        Body, Error, HandlerFuture, HandlerMap, HttpResponse, HttpServer, HttpStatus, Outcome,
        RequestHandler, ServerConfig,
    };

    const READ_TIMEOUT: Duration = Duration::from_secs(5);

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: Vec<u8>) -> Self {
            Self {
                read_data: Cursor::new(read_data),
                write_data: Vec::new(),
            }
        }

        fn written_data(&self) -> &[u8] {
            &self.write_data
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Handler answering 200 with a fixed text body.
    struct TextHandler(&'static str);

    impl RequestHandler for TextHandler {
        fn handle<'a>(
            &'a self,
            _request: &'a HttpRequest,
            response: &'a mut HttpResponse,
        ) -> HandlerFuture<'a> {
            Box::pin(async move {
                response.status = HttpStatus::Ok;
                response.set_header("Content-Type", "text/plain");
                response.set_text_body(self.0);
                Ok(Outcome::Served)
            })
        }
    }

    /// Handler that declines every request.
    struct DecliningHandler;

    impl RequestHandler for DecliningHandler {
        fn handle<'a>(
            &'a self,
            _request: &'a HttpRequest,
            _response: &'a mut HttpResponse,
        ) -> HandlerFuture<'a> {
            Box::pin(async move { Ok(Outcome::Declined) })
        }
    }

    /// Handler that fails every request.
    struct FaultingHandler;

    impl RequestHandler for FaultingHandler {
        fn handle<'a>(
            &'a self,
            _request: &'a HttpRequest,
            _response: &'a mut HttpResponse,
        ) -> HandlerFuture<'a> {
            Box::pin(async move { Err(Error::Handler("boom".to_string())) })
        }
    }

    fn registry() -> Arc<RwLock<HandlerMap>> {
        Arc::new(RwLock::new(HandlerMap::new()))
    }

    #[tokio::test]
    async fn test_response_write_format() {
        let mut response = HttpResponse::new();
        response.status = HttpStatus::Ok;
        response.set_header("Content-Type", "text/plain");
        response.set_text_body("hello");

        let mut written = Vec::new();
        response.write_to(&mut written).await.unwrap();

        let text = String::from_utf8(written).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[tokio::test]
    async fn test_response_streamed_body() {
        // A body larger than one copy chunk must arrive intact.
        let payload = vec![0xabu8; 40 * 1024];
        let mut response = HttpResponse::new();
        response.status = HttpStatus::Ok;
        response.set_header("Content-Length", payload.len().to_string());
        response.body = Body::Stream(Box::new(Cursor::new(payload.clone())));

        let mut written = Vec::new();
        response.write_to(&mut written).await.unwrap();

        let split = written
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap();
        assert_eq!(&written[split + 4..], &payload[..]);
    }

    #[tokio::test]
    async fn test_response_defaults_to_not_found() {
        let response = HttpResponse::new();
        assert_eq!(response.status, HttpStatus::NotFound);
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let request = b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut stream = MockTcpStream::new(request.to_vec());

        let handlers = registry();
        handlers
            .write()
            .await
            .insert("/test".to_string(), Arc::new(TextHandler("Test response")));

        let result = HttpServer::handle_connection(&mut stream, handlers, READ_TIMEOUT).await;
        assert!(result.is_ok());

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.contains("Test response"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_unregistered_path() {
        let request = b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let mut stream = MockTcpStream::new(request.to_vec());

        let result = HttpServer::handle_connection(&mut stream, registry(), READ_TIMEOUT).await;
        assert!(result.is_ok());

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with("\r\n\r\nNot Found"));
    }

    #[tokio::test]
    async fn test_declining_handler_yields_not_found() {
        let handlers = registry();
        handlers
            .write()
            .await
            .insert("/gone".to_string(), Arc::new(DecliningHandler));

        let request = HttpRequest {
            method: "GET".to_string(),
            path: "/gone".to_string(),
            protocol: "HTTP/1.1".to_string(),
            query: Default::default(),
            headers: Default::default(),
        };
        let response = HttpServer::dispatch(&handlers, &request).await;
        assert_eq!(response.status, HttpStatus::NotFound);
        match response.body {
            Body::Bytes(bytes) => assert_eq!(bytes, b"Not Found"),
            _ => panic!("expected a buffered body"),
        }
    }

    #[tokio::test]
    async fn test_faulting_handler_yields_internal_error() {
        let request = b"GET /fault HTTP/1.1\r\n\r\n";
        let mut stream = MockTcpStream::new(request.to_vec());

        let handlers = registry();
        handlers
            .write()
            .await
            .insert("/fault".to_string(), Arc::new(FaultingHandler));

        let result = HttpServer::handle_connection(&mut stream, handlers, READ_TIMEOUT).await;
        assert!(result.is_ok());

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        // The error detail is exposed to the client on purpose.
        assert!(response.contains("boom"));
    }

    #[tokio::test]
    async fn test_malformed_request_line_yields_internal_error() {
        let request = b"GARBAGE\r\n\r\n";
        let mut stream = MockTcpStream::new(request.to_vec());

        let result = HttpServer::handle_connection(&mut stream, registry(), READ_TIMEOUT).await;
        assert!(matches!(result, Err(Error::Parse(_))));

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("malformed request line"));
    }

    #[tokio::test]
    async fn test_immediate_eof_writes_nothing() {
        let mut stream = MockTcpStream::new(Vec::new());

        let result = HttpServer::handle_connection(&mut stream, registry(), READ_TIMEOUT).await;
        assert!(result.is_ok());
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_handler() {
        let server = HttpServer::new(ServerConfig::default());
        let request = HttpRequest {
            method: "GET".to_string(),
            path: "/ping".to_string(),
            protocol: "HTTP/1.1".to_string(),
            query: Default::default(),
            headers: Default::default(),
        };

        server.add_handler("/ping", Arc::new(TextHandler("pong"))).await;
        let response = server.serve_request(&request).await;
        assert_eq!(response.status, HttpStatus::Ok);

        // Re-registering the same path replaces the handler.
        server.add_handler("/ping", Arc::new(DecliningHandler)).await;
        let response = server.serve_request(&request).await;
        assert_eq!(response.status, HttpStatus::NotFound);

        server.remove_handler("/ping").await;
        let response = server.serve_request(&request).await;
        assert_eq!(response.status, HttpStatus::NotFound);
    }

    #[tokio::test]
    async fn test_server_lifecycle_over_real_sockets() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        let server = HttpServer::new(config);
        server.add_handler("/ping", Arc::new(TextHandler("pong"))).await;

        let addr = server.start().await.unwrap();
        assert_eq!(server.local_addr(), Some(addr));

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        let text = String::from_utf8_lossy(&response);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("pong"));

        server.stop().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());

        // Stopped is terminal.
        assert!(matches!(server.start().await, Err(Error::InvalidState)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_independent_responses() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        let server = HttpServer::new(config);
        server.add_handler("/a", Arc::new(TextHandler("alpha"))).await;
        server.add_handler("/b", Arc::new(TextHandler("beta"))).await;
        let addr = server.start().await.unwrap();

        async fn fetch(addr: std::net::SocketAddr, path: &str) -> String {
            let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
            let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
            client.write_all(request.as_bytes()).await.unwrap();
            let mut response = Vec::new();
            client.read_to_end(&mut response).await.unwrap();
            String::from_utf8_lossy(&response).into_owned()
        }

        let (a, b) = tokio::join!(fetch(addr, "/a"), fetch(addr, "/b"));
        assert!(a.ends_with("alpha"));
        assert!(b.ends_with("beta"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        // Bind twice on the same port without reuseport: the second must fail.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = ServerConfig {
            addr,
            ..ServerConfig::default()
        };
        let server = HttpServer::new(config);
        assert!(matches!(server.start().await, Err(Error::Io(_))));
    }
}
