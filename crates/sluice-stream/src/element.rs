use std::io::{self, BufRead, Write};

/// Unit a handle reads or writes.
///
/// `read_from` returns `Ok(None)` at end of stream. Text elements are UTF-8;
/// malformed input surfaces as [`io::ErrorKind::InvalidData`].
pub trait Element: Sized + Send + 'static {
    /// Stable tag used for provider lookup and diagnostics.
    const NAME: &'static str;

    fn read_from(reader: &mut dyn BufRead) -> io::Result<Option<Self>>;

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()>;
}

impl Element for u8 {
    const NAME: &'static str = "byte";

    fn read_from(reader: &mut dyn BufRead) -> io::Result<Option<Self>> {
        let byte = match reader.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        reader.consume(1);
        Ok(Some(byte))
    }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> { writer.write_all(&[*self]) }
}

impl Element for char {
    const NAME: &'static str = "char";

    fn read_from(reader: &mut dyn BufRead) -> io::Result<Option<Self>> {
        let Some(first) = u8::read_from(reader)? else {
            return Ok(None);
        };
        let width = utf8_width(first).ok_or_else(|| invalid_utf8(first))?;

        let mut buf = [first, 0, 0, 0];
        reader.read_exact(&mut buf[1..width])?;

        std::str::from_utf8(&buf[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .chars()
            .next()
            .map(Some)
            .ok_or_else(|| invalid_utf8(first))
    }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        let mut buf = [0; 4];
        writer.write_all(self.encode_utf8(&mut buf).as_bytes())
    }
}

/// Lines, without their terminator.
impl Element for String {
    const NAME: &'static str = "line";

    fn read_from(reader: &mut dyn BufRead) -> io::Result<Option<Self>> {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(self.as_bytes())?;
        writer.write_all(b"\n")
    }
}

fn utf8_width(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(first: u8) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid utf-8 sequence starting with 0x{first:02x}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<T: Element>(bytes: &[u8]) -> io::Result<Vec<T>> {
        let mut reader = Cursor::new(bytes.to_vec());
        let mut items = Vec::new();
        while let Some(item) = T::read_from(&mut reader)? {
            items.push(item);
        }
        Ok(items)
    }

    #[test]
    fn test_bytes() {
        assert_eq!(drain::<u8>(b"ab").unwrap(), vec![b'a', b'b']);
        assert!(drain::<u8>(b"").unwrap().is_empty());
    }

    #[test]
    fn test_chars_decode_multibyte() {
        assert_eq!(drain::<char>("aé€😀".as_bytes()).unwrap(), vec!['a', 'é', '€', '😀']);
    }

    #[test]
    fn test_chars_reject_invalid_lead_byte() {
        let err = drain::<char>(&[b'a', 0xFF]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_chars_truncated_sequence() {
        let err = drain::<char>(&[0xE2, 0x82]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_lines_strip_terminators() {
        let lines = drain::<String>(b"one\ntwo\r\nthree").unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_lines_keep_empty_lines() {
        assert_eq!(drain::<String>(b"\n\nx\n").unwrap(), vec!["", "", "x"]);
    }

    #[test]
    fn test_write_encodings() {
        let mut out = Vec::new();
        b'x'.write_to(&mut out).unwrap();
        'é'.write_to(&mut out).unwrap();
        "line".to_string().write_to(&mut out).unwrap();
        assert_eq!(out, "xéline\n".as_bytes());
    }
}
