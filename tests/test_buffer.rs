use owlet::http::buffer::SpoolBuffer;

#[test]
fn test_write_flip_read_round_trip() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"hello ").unwrap();
    buf.write(b"world").unwrap();

    assert_eq!(buf.size().unwrap(), 11);
    assert!(!buf.is_spooled());

    buf.flip().unwrap();
    assert_eq!(buf.read_to_end().unwrap(), b"hello world");
}

#[test]
fn test_size_before_flip_equals_bytes_written() {
    let mut buf = SpoolBuffer::with_threshold(1024);
    for _ in 0..10 {
        buf.write(&[0xAB; 37]).unwrap();
    }
    assert_eq!(buf.size().unwrap(), 370);
}

#[test]
fn test_spills_to_file_when_threshold_crossed() {
    let mut buf = SpoolBuffer::with_threshold(16);
    buf.write(&[1u8; 10]).unwrap();
    assert!(!buf.is_spooled());
    assert!(buf.spool_path().is_none());

    buf.write(&[2u8; 10]).unwrap();
    assert!(buf.is_spooled());
    assert!(buf.spool_path().is_some());

    buf.flip().unwrap();
    let mut expected = vec![1u8; 10];
    expected.extend_from_slice(&[2u8; 10]);
    assert_eq!(buf.read_to_end().unwrap(), expected);
    assert_eq!(buf.size().unwrap(), 20);
}

#[test]
fn test_stays_in_memory_at_exactly_threshold() {
    let mut buf = SpoolBuffer::with_threshold(16);
    buf.write(&[0u8; 16]).unwrap();
    assert!(!buf.is_spooled());
}

#[test]
fn test_spool_file_removed_on_drop() {
    let path = {
        let mut buf = SpoolBuffer::with_threshold(4);
        buf.write(b"spilled bytes").unwrap();
        buf.spool_path().unwrap().to_path_buf()
    };
    assert!(!path.exists());
}

#[test]
fn test_read_line_splits_on_lf() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"first\r\nsecond\r\ntail").unwrap();
    buf.flip().unwrap();

    assert_eq!(buf.read_line().unwrap(), b"first\r\n");
    assert_eq!(buf.read_line().unwrap(), b"second\r\n");
    assert_eq!(buf.read_line().unwrap(), b"tail");
    assert_eq!(buf.read_line().unwrap(), b"");
}

#[test]
fn test_seek_and_tell() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"0123456789").unwrap();
    buf.flip().unwrap();

    assert_eq!(buf.tell().unwrap(), 0);
    buf.seek(4).unwrap();
    assert_eq!(buf.tell().unwrap(), 4);
    assert_eq!(buf.read_at_most(3).unwrap(), b"456");
    assert_eq!(buf.tell().unwrap(), 7);
}

#[test]
fn test_seek_and_tell_spooled() {
    let mut buf = SpoolBuffer::with_threshold(2);
    buf.write(b"0123456789").unwrap();
    assert!(buf.is_spooled());
    buf.flip().unwrap();

    buf.seek(6).unwrap();
    assert_eq!(buf.read_at_most(10).unwrap(), b"6789");
}

#[test]
fn test_read_at_most_stops_at_end() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"abc").unwrap();
    buf.flip().unwrap();
    assert_eq!(buf.read_at_most(10).unwrap(), b"abc");
    assert_eq!(buf.read_at_most(10).unwrap(), b"");
}

#[test]
#[should_panic(expected = "not writable")]
fn test_write_after_flip_panics() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"x").unwrap();
    buf.flip().unwrap();
    let _ = buf.write(b"y");
}

#[test]
#[should_panic(expected = "not readable")]
fn test_read_before_flip_panics() {
    let mut buf = SpoolBuffer::new();
    buf.write(b"x").unwrap();
    let mut out = [0u8; 1];
    let _ = buf.read(&mut out);
}
