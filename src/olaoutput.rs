use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::error::{Error, Result};
use crate::output::LedOutput;
use crate::pixels::Pixel;
use crate::settings::ColorOrder;

const DMX_CHANNELS: usize = 512;
/// Whole RGB pixels that fit in one DMX universe.
pub const PIXELS_PER_UNIVERSE: usize = DMX_CHANNELS / 3;

/// Sends frames to an OLA daemon as DMX blobs over OSC, one universe per
/// 170 pixels.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    universe: u16,
    color_order: ColorOrder,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(target_addr: SocketAddr, universe: u16, color_order: ColorOrder) -> Result<Self> {
        let our_addr = if target_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let sock = UdpSocket::bind(our_addr)?;

        Ok(OlaOutput {
            sock,
            target_addr,
            universe,
            color_order,
            buffer: vec![0; DMX_CHANNELS],
        })
    }

    fn set_rgb(&mut self, start_channel: usize, pixel: &Pixel) {
        let values = match self.color_order {
            ColorOrder::Rgb => [pixel.red, pixel.green, pixel.blue],
            ColorOrder::Grb => [pixel.green, pixel.red, pixel.blue],
        };
        self.buffer[start_channel..start_channel + 3].copy_from_slice(&values);
    }

    fn flush(&mut self, universe: u16) -> Result<()> {
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: format!("/dmx/universe/{}", universe),
            args: vec![OscType::Blob(self.buffer.clone())],
        }))
        .map_err(|err| Error::Osc(format!("{:?}", err)))?;
        self.sock.send_to(&msg_buf, self.target_addr)?;
        Ok(())
    }
}

impl LedOutput for OlaOutput {
    fn show(&mut self, pixels: &[Pixel]) -> Result<()> {
        for (index, chunk) in pixels.chunks(PIXELS_PER_UNIVERSE).enumerate() {
            self.buffer.fill(0);
            for (i, pixel) in chunk.iter().enumerate() {
                self.set_rgb(i * 3, pixel);
            }
            self.flush(self.universe.wrapping_add(index as u16))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use palette::Srgb;
    use rosc::decoder;

    use super::*;

    fn receive(sock: &UdpSocket) -> (String, Vec<u8>) {
        let mut buf = [0u8; decoder::MTU];
        let size = sock.recv(&mut buf).unwrap();
        match decoder::decode(&buf[..size]).unwrap() {
            OscPacket::Message(mut msg) => match msg.args.pop() {
                Some(OscType::Blob(blob)) => (msg.addr, blob),
                other => panic!("unexpected argument {:?}", other),
            },
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn long_strip_spans_universes_in_grb_order() {
        let ola = UdpSocket::bind("127.0.0.1:0").unwrap();
        ola.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut output = OlaOutput::new(ola.local_addr().unwrap(), 4, ColorOrder::Grb).unwrap();

        let mut pixels = vec![Srgb::new(0, 0, 0); 200];
        pixels[0] = Srgb::new(10, 20, 30);
        pixels[170] = Srgb::new(1, 2, 3);
        output.show(&pixels).unwrap();

        let (addr, blob) = receive(&ola);
        assert_eq!(addr, "/dmx/universe/4");
        assert_eq!(blob.len(), 512);
        assert_eq!(&blob[0..3], &[20, 10, 30]);

        let (addr, blob) = receive(&ola);
        assert_eq!(addr, "/dmx/universe/5");
        assert_eq!(&blob[0..3], &[2, 1, 3]);
        assert!(blob[90..].iter().all(|b| *b == 0));
    }
}
