//! Protocol state values and the static transition-legality tables. Spec §4.5.

/// the states both roles share names for. `#[repr(u8)]` so a `State` is
/// exactly the 1-byte wire header spec §6 describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    None = 0,
    Connected = 1,
    RulesReceived = 2,
    ChoosingName = 3,
    SentName = 4,
    NotAcked = 5,
    Acked = 6,
    Guessing = 7,
    AwaitingFeedback = 8,
    GotFeedback = 9,
    Finished = 10,
    Aborted = 11,
    Disconnected = 12,
}

impl State {
    pub fn from_u8(byte: u8) -> Option<Self> {
        use State::*;
        Some(match byte {
            0 => None,
            1 => Connected,
            2 => RulesReceived,
            3 => ChoosingName,
            4 => SentName,
            5 => NotAcked,
            6 => Acked,
            7 => Guessing,
            8 => AwaitingFeedback,
            9 => GotFeedback,
            10 => Finished,
            11 => Aborted,
            12 => Disconnected,
            _ => return std::option::Option::None,
        })
    }
}

/// which side of the wire is validating an incoming transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

/// is `(from, to)` a legal transition for messages *received* by `role`?
/// Spec §4.5's client-receive and server-receive legal sets, plus the
/// universal `* -> Aborted` and `Aborted -> Disconnected` escapes that
/// apply on both sides.
pub fn is_legal(role: Role, from: State, to: State) -> bool {
    use State::*;

    if to == Aborted {
        return true;
    }
    if from == Aborted && to == Disconnected {
        return true;
    }

    match role {
        Role::Client => matches!(
            (from, to),
            (Connected, RulesReceived)
                | (RulesReceived, ChoosingName)
                | (SentName, ChoosingName)
                | (SentName, NotAcked)
                | (Acked, Acked)
                | (Acked, Guessing)
                | (Acked, Finished)
                | (AwaitingFeedback, GotFeedback)
                | (GotFeedback, Guessing)
                | (GotFeedback, Finished)
                | (Finished, NotAcked)
                | (Finished, Disconnected)
        ),
        Role::Server => matches!(
            (from, to),
            (None, Connected)
                | (ChoosingName, SentName)
                | (NotAcked, Acked)
                | (Guessing, AwaitingFeedback)
        ),
    }
}
