use std::net::UdpSocket;
use std::str;
use std::{env, io};

pub fn communicate(addr: &str) -> anyhow::Result<()> {
    let sock = UdpSocket::bind("0.0.0.0:0")?;
    loop {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }
        // a blank line sends a zero-length datagram, which stops the server
        let input = input.trim();
        sock.send_to(input.as_bytes(), addr)?;
        if input.is_empty() {
            return Ok(());
        }

        let mut buf = [0u8; 1024];
        let (len, _) = sock.recv_from(&mut buf)?;
        println!("{}", str::from_utf8(&buf[..len])?);
    }
}

fn main() -> anyhow::Result<()> {
    let args = env::args().collect::<Vec<String>>();
    anyhow::ensure!(args.len() == 2, "requirement args: <ADDR>");

    let addr = args[1].as_str();
    communicate(addr)?;

    Ok(())
}
