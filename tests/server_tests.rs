// tests/server_tests.rs
// End-to-end exchange over a real loopback socket.

use image::{ImageFormat, Rgb, RgbImage};
use labyrinth_nav::{LabyrinthConfig, Server, WireCommand};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn send_frame(stream: &mut TcpStream, image: &RgbImage) {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();
    stream.write_all(&(png.len() as u32).to_be_bytes()).unwrap();
    stream.write_all(&png).unwrap();
    stream.flush().unwrap();
}

fn read_reply(reader: &mut BufReader<TcpStream>) -> WireCommand {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line.parse().unwrap()
}

#[test]
fn serves_commands_until_stopped() {
    let mut config = LabyrinthConfig::default();
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.server.accept_poll_ms = 10;

    let server = Server::bind(&config).unwrap();
    let addr = server.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let handle = thread::spawn(move || server.run(flag));

    let mut client = TcpStream::connect(addr).unwrap();
    client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut reader = BufReader::new(client.try_clone().unwrap());

    // Black frame: nothing to see, drive on.
    send_frame(&mut client, &RgbImage::new(64, 48));
    assert_eq!(read_reply(&mut reader), WireCommand::Move(1));

    // Red square right of center: fine turn toward it.
    let mut image = RgbImage::new(64, 48);
    for y in 18..30 {
        for x in 44..56 {
            image.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
    send_frame(&mut client, &image);
    assert_eq!(read_reply(&mut reader), WireCommand::Rotate(5));

    // Garbage payload: searching turn, connection stays up.
    client.write_all(&4u32.to_be_bytes()).unwrap();
    client.write_all(b"junk").unwrap();
    assert_eq!(read_reply(&mut reader), WireCommand::Rotate(10));

    drop(reader);
    drop(client);
    running.store(false, Ordering::Relaxed);
    handle.join().unwrap().unwrap();
}
