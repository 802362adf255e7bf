use std::{collections::VecDeque, io::BufRead};

use binaural_bridge::ListenerGeometry;

/// Reads listener geometry from a text stream.
///
/// Each geometry is two whitespace-separated real numbers, the distance
/// followed by the azimuth in degrees. Numbers may be spread over any number
/// of lines. The stream ends at end of input or at the first token that is
/// not a number.
pub struct ParameterReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> ParameterReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Returns the next geometry, or `None` once the input is over.
    pub fn next_geometry(&mut self) -> std::io::Result<Option<ListenerGeometry>> {
        let Some(distance) = self.next_number()? else {
            return Ok(None);
        };
        let Some(azimuth_degrees) = self.next_number()? else {
            return Ok(None);
        };
        Ok(Some(ListenerGeometry::new(distance, azimuth_degrees)))
    }

    fn next_number(&mut self) -> std::io::Result<Option<f64>> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };
        match token.parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                log::warn!("Expected a number but got {token:?}, ending input");
                Ok(None)
            }
        }
    }

    fn next_token(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(String::from));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read_all(text: &str) -> Vec<ListenerGeometry> {
        let mut reader = ParameterReader::new(Cursor::new(text));
        let mut geometries = Vec::new();
        while let Some(geometry) = reader.next_geometry().expect("in-memory read") {
            geometries.push(geometry);
        }
        geometries
    }

    #[test]
    fn reads_one_pair_per_line() {
        assert_eq!(
            read_all("10 90\n2.5 -30\n"),
            [
                ListenerGeometry::new(10.0, 90.0),
                ListenerGeometry::new(2.5, -30.0)
            ]
        );
    }

    #[test]
    fn pairs_may_span_lines_and_share_lines() {
        assert_eq!(
            read_all("4\n\n  45\n1 2 3 4"),
            [
                ListenerGeometry::new(4.0, 45.0),
                ListenerGeometry::new(1.0, 2.0),
                ListenerGeometry::new(3.0, 4.0)
            ]
        );
    }

    #[test]
    fn malformed_token_ends_the_stream() {
        assert_eq!(
            read_all("1 10\n3 left\n5 5\n"),
            [ListenerGeometry::new(1.0, 10.0)]
        );
    }

    #[test]
    fn incomplete_pair_at_end_of_input_is_dropped() {
        assert!(read_all("").is_empty());
        assert!(read_all("7\n").is_empty());
    }
}
