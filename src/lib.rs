use anyhow::Context;
use mio::{unix::SourceFd, Events, Interest, Poll, Token};
use socket2::{Domain, Socket, Type};
use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    os::unix::io::AsRawFd,
    str,
};
use tracing::info;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8888";
pub const REPLY_PREFIX: &str = "OK...";

const RECV_BUF_LEN: usize = 1024;
const LISTENER: Token = Token(0);

#[derive(Debug)]
pub struct EchoServer {
    socket: UdpSocket,
    local: SocketAddr,
}

impl EchoServer {
    pub fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, None)
            .context("failed to create datagram socket")?;
        info!("socket created");

        socket
            .bind(&addr.into())
            .with_context(|| format!("bind failed on {}", addr))?;

        let socket: UdpSocket = socket.into();
        socket.set_nonblocking(true)?;
        let local = socket.local_addr()?;
        info!("socket bind complete on {}", local);

        Ok(Self { socket, local })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn serve(&mut self) -> anyhow::Result<()> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(1);

        poll.registry().register(
            &mut SourceFd(&self.socket.as_raw_fd()),
            LISTENER,
            Interest::READABLE,
        )?;

        let mut buf = [0u8; RECV_BUF_LEN];

        loop {
            poll.poll(&mut events, None)?;
            for event in events.iter() {
                match event.token() {
                    LISTENER => {
                        if !self.drain(&mut buf)? {
                            return Ok(());
                        }
                    }
                    _ => unreachable!(),
                }
            }
        }
    }

    // Returns false once a zero-length payload asks the loop to stop.
    fn drain(&mut self, buf: &mut [u8]) -> anyhow::Result<bool> {
        loop {
            let (len, peer) = match self.socket.recv_from(buf) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(true),
                Err(e) => return Err(e.into()),
            };

            let text = str::from_utf8(&buf[..len])
                .with_context(|| format!("non-utf8 payload from {}", peer))?;
            if text.is_empty() {
                return Ok(false);
            }

            let reply = reply_to(text);
            self.socket.send_to(reply.as_bytes(), peer)?;
            info!("Message[{}:{}] - {}", peer.ip(), peer.port(), text.trim());
        }
    }
}

pub fn reply_to(payload: &str) -> String {
    format!("{}{}", REPLY_PREFIX, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_prefixes_payload() {
        assert_eq!(reply_to("hello"), "OK...hello");
    }

    #[test]
    fn reply_keeps_payload_verbatim() {
        assert_eq!(reply_to(" spaced out \n"), "OK... spaced out \n");
    }

    #[test]
    fn bind_picks_a_concrete_port() {
        let server = EchoServer::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }
}
