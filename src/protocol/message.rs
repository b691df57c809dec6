//! Fixed-size wire payloads. Spec §4.5, §6: little-endian, no padding, no
//! length prefix — every field width below is exactly what's sent.

use byteorder::ByteOrder;
use byteorder::LittleEndian as LE;

use crate::MAX_MAX_GUESSES;
use crate::MAX_NAME_BYTES;
use crate::MAX_NUM_PLAYERS;
use crate::solver::MatchState;

fn pack_name(name: &str) -> [u8; MAX_NAME_BYTES] {
    let mut buf = [0u8; MAX_NAME_BYTES];
    let bytes = name.as_bytes();
    let n = bytes.len().min(MAX_NAME_BYTES - 1);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn unpack_name(buf: &[u8; MAX_NAME_BYTES]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// payload following a transition to `RulesReceived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesPayload {
    pub player_id: u8,
    pub num_rounds: u8,
    pub max_guesses: u8,
    pub num_slots: u8,
    pub num_players: u8,
    pub num_colors: u8,
}

impl RulesPayload {
    pub const LEN: usize = 6;

    pub fn encode(&self) -> [u8; Self::LEN] {
        [
            self.player_id,
            self.num_rounds,
            self.max_guesses,
            self.num_slots,
            self.num_players,
            self.num_colors,
        ]
    }

    pub fn decode(buf: &[u8; Self::LEN]) -> Self {
        Self {
            player_id: buf[0],
            num_rounds: buf[1],
            max_guesses: buf[2],
            num_slots: buf[3],
            num_players: buf[4],
            num_colors: buf[5],
        }
    }
}

/// payload following a transition to `SentName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePayload {
    pub name: String,
}

impl NamePayload {
    pub const LEN: usize = MAX_NAME_BYTES;

    pub fn encode(&self) -> [u8; Self::LEN] {
        pack_name(&self.name)
    }

    pub fn decode(buf: &[u8; Self::LEN]) -> Self {
        Self {
            name: unpack_name(buf),
        }
    }
}

/// payload sent exactly once, immediately before the first round's
/// `Guessing` broadcast, attached to the server's `Acked` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllNamesPayload {
    pub names: Vec<String>,
}

impl AllNamesPayload {
    pub const LEN: usize = MAX_NAME_BYTES * MAX_NUM_PLAYERS as usize;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        for (i, name) in self.names.iter().take(MAX_NUM_PLAYERS as usize).enumerate() {
            let packed = pack_name(name);
            buf[i * MAX_NAME_BYTES..(i + 1) * MAX_NAME_BYTES].copy_from_slice(&packed);
        }
        buf
    }

    pub fn decode(buf: &[u8; Self::LEN], num_players: usize) -> Self {
        let mut names = Vec::with_capacity(num_players);
        for i in 0..num_players {
            let mut chunk = [0u8; MAX_NAME_BYTES];
            chunk.copy_from_slice(&buf[i * MAX_NAME_BYTES..(i + 1) * MAX_NAME_BYTES]);
            names.push(unpack_name(&chunk));
        }
        Self { names }
    }
}

/// payload following a transition to `AwaitingFeedback` (client -> server:
/// the guess being played).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessPayload {
    pub guess: u16,
}

impl GuessPayload {
    pub const LEN: usize = 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        LE::write_u16(&mut buf, self.guess);
        buf
    }

    pub fn decode(buf: &[u8; Self::LEN]) -> Self {
        Self {
            guess: LE::read_u16(buf),
        }
    }
}

/// payload following a transition to `GotFeedback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackPayload {
    pub feedback: u16,
    pub match_state: MatchState,
    /// valid iff `match_state == Lost`.
    pub solution: u16,
    pub waiting_for_others: bool,
}

impl FeedbackPayload {
    pub const LEN: usize = 6;

    fn encode_match_state(state: MatchState) -> u8 {
        match state {
            MatchState::Pending => 0,
            MatchState::Won => 1,
            MatchState::Lost => 2,
        }
    }

    fn decode_match_state(byte: u8) -> MatchState {
        match byte {
            1 => MatchState::Won,
            2 => MatchState::Lost,
            _ => MatchState::Pending,
        }
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        LE::write_u16(&mut buf[0..2], self.feedback);
        buf[2] = Self::encode_match_state(self.match_state);
        LE::write_u16(&mut buf[3..5], self.solution);
        buf[5] = self.waiting_for_others as u8;
        buf
    }

    pub fn decode(buf: &[u8; Self::LEN]) -> Self {
        Self {
            feedback: LE::read_u16(&buf[0..2]),
            match_state: Self::decode_match_state(buf[2]),
            solution: LE::read_u16(&buf[3..5]),
            waiting_for_others: buf[5] != 0,
        }
    }
}

/// payload following a transition to `NotAcked` at round end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEndPayload {
    /// `None` encodes the "no winner" sentinel (-1 on the wire).
    pub winner: Option<u8>,
    pub win_by_speed_tie: bool,
    pub points: Vec<u8>,
    pub turns: Vec<u8>,
    pub guesses: Vec<Vec<u16>>,
    pub solution: u16,
}

impl RoundEndPayload {
    pub const LEN: usize =
        1 + 1 + MAX_NUM_PLAYERS as usize + MAX_NUM_PLAYERS as usize
            + MAX_NUM_PLAYERS as usize * MAX_MAX_GUESSES as usize * 2
            + 2;

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0] = self.winner.map(|w| w as i16 as u8).unwrap_or(0xFF);
        buf[1] = self.win_by_speed_tie as u8;
        let mut off = 2;
        for i in 0..MAX_NUM_PLAYERS as usize {
            buf[off + i] = self.points.get(i).copied().unwrap_or(0);
        }
        off += MAX_NUM_PLAYERS as usize;
        for i in 0..MAX_NUM_PLAYERS as usize {
            buf[off + i] = self.turns.get(i).copied().unwrap_or(0);
        }
        off += MAX_NUM_PLAYERS as usize;
        for p in 0..MAX_NUM_PLAYERS as usize {
            for t in 0..MAX_MAX_GUESSES as usize {
                let guess = self
                    .guesses
                    .get(p)
                    .and_then(|row| row.get(t))
                    .copied()
                    .unwrap_or(0);
                let at = off + (p * MAX_MAX_GUESSES as usize + t) * 2;
                LE::write_u16(&mut buf[at..at + 2], guess);
            }
        }
        off += MAX_NUM_PLAYERS as usize * MAX_MAX_GUESSES as usize * 2;
        LE::write_u16(&mut buf[off..off + 2], self.solution);
        buf
    }

    pub fn decode(buf: &[u8; Self::LEN], num_players: usize, max_guesses: usize) -> Self {
        let winner = if buf[0] == 0xFF { None } else { Some(buf[0]) };
        let win_by_speed_tie = buf[1] != 0;
        let mut off = 2;
        let points = buf[off..off + num_players].to_vec();
        off += MAX_NUM_PLAYERS as usize;
        let turns = buf[off..off + num_players].to_vec();
        off += MAX_NUM_PLAYERS as usize;
        let mut guesses = Vec::with_capacity(num_players);
        for p in 0..num_players {
            let mut row = Vec::with_capacity(max_guesses);
            for t in 0..max_guesses {
                let at = off + (p * MAX_MAX_GUESSES as usize + t) * 2;
                row.push(LE::read_u16(&buf[at..at + 2]));
            }
            guesses.push(row);
        }
        off += MAX_NUM_PLAYERS as usize * MAX_MAX_GUESSES as usize * 2;
        let solution = LE::read_u16(&buf[off..off + 2]);
        Self {
            winner,
            win_by_speed_tie,
            points,
            turns,
            guesses,
            solution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrips_through_the_null_padded_buffer() {
        let payload = NamePayload {
            name: "alice".to_string(),
        };
        let encoded = payload.encode();
        assert_eq!(NamePayload::decode(&encoded), payload);
    }

    #[test]
    fn name_longer_than_buffer_is_truncated_not_overflowed() {
        let long = "x".repeat(100);
        let payload = NamePayload { name: long };
        let encoded = payload.encode();
        assert_eq!(encoded.len(), MAX_NAME_BYTES);
        assert_eq!(encoded[MAX_NAME_BYTES - 1], 0);
    }

    #[test]
    fn feedback_payload_roundtrips() {
        let payload = FeedbackPayload {
            feedback: 17,
            match_state: MatchState::Lost,
            solution: 441,
            waiting_for_others: true,
        };
        assert_eq!(FeedbackPayload::decode(&payload.encode()), payload);
    }

    #[test]
    fn round_end_payload_roundtrips_with_no_winner() {
        let payload = RoundEndPayload {
            winner: None,
            win_by_speed_tie: false,
            points: vec![1, 0, 2, 0],
            turns: vec![5, 8, 3, 8],
            guesses: vec![vec![0u16; 20]; 4],
            solution: 42,
        };
        let encoded = payload.encode();
        let decoded = RoundEndPayload::decode(&encoded, 4, 20);
        assert_eq!(decoded.winner, None);
        assert_eq!(decoded.points, payload.points);
        assert_eq!(decoded.solution, 42);
    }
}
