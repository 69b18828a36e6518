//! Control-channel (TCP) glue: the typed read/write half of
//! [`protocol::ControlMessage`] over a live socket.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use protocol::{ControlMessage, CONTROL_RECV_TIMEOUT};

/// A control-channel connection with the fixed 15-second receive timeout
/// already applied.
pub struct ControlChannel {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl ControlChannel {
    /// Wraps `stream`, applying the control channel's fixed receive
    /// timeout.
    ///
    /// # Errors
    ///
    /// Propagates any error from setting the socket's read timeout or
    /// cloning its handle.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_read_timeout(Some(CONTROL_RECV_TIMEOUT))?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }

    /// Sends `message` as a newline-terminated line.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the underlying socket.
    pub fn send(&mut self, message: &ControlMessage) -> io::Result<()> {
        self.writer.write_all(message.encode().as_bytes())
    }

    /// Waits up to the control channel's receive timeout for the next
    /// line, returning `Ok(None)` if the timeout elapses before one
    /// arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket reports anything other than a
    /// timeout, or if the peer closes the connection.
    pub fn recv(&mut self) -> io::Result<Option<ControlMessage>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "control channel closed by peer",
            )),
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']);
                ControlMessage::parse(trimmed)
                    .map(Some)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
            }
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn send_and_recv_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            let mut channel = ControlChannel::new(stream).expect("wrap stream");
            channel
                .send(&ControlMessage::Ack(7))
                .expect("send ack");
        });

        let client_stream = TcpStream::connect(addr).expect("connect to listener");
        let mut client = ControlChannel::new(client_stream).expect("wrap client stream");
        let received = client.recv().expect("recv succeeds").expect("message present");
        assert_eq!(received, ControlMessage::Ack(7));

        server.join().expect("server thread joins");
    }

    #[test]
    fn recv_times_out_with_none_when_peer_is_silent() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let server = thread::spawn(move || {
            let (_stream, _) = listener.accept().expect("accept connection");
            thread::sleep(std::time::Duration::from_millis(200));
        });

        let client_stream = TcpStream::connect(addr).expect("connect");
        client_stream
            .set_read_timeout(Some(std::time::Duration::from_millis(20)))
            .expect("set short timeout for the test");
        let mut client = ControlChannel {
            reader: BufReader::new(client_stream.try_clone().expect("clone")),
            writer: client_stream,
        };
        assert!(client.recv().expect("timeout is not an error").is_none());
        server.join().expect("server thread joins");
    }
}
