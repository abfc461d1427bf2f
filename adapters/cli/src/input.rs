//! Line-oriented player input.

use subjunctive_core::Direction;

/// One line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Push the player one step.
    Move(Direction),
    /// Leave the game.
    Quit,
}

/// Parses a direction word (`left`, `up`, ...), a vi key (`h`, `k`, `l`,
/// `j`), a WASD key, or `q`/`quit`. Case and surrounding whitespace are
/// ignored.
pub(crate) fn parse_command(line: &str) -> Option<Command> {
    let word = line.trim().to_ascii_lowercase();
    let direction = match word.as_str() {
        "q" | "quit" | "exit" => return Some(Command::Quit),
        "h" | "a" => Direction::Left,
        "k" | "w" => Direction::Up,
        "l" | "d" => Direction::Right,
        "j" | "s" => Direction::Down,
        other => other.parse().ok()?,
    };
    Some(Command::Move(direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spelling_of_a_direction_is_accepted() {
        for (inputs, direction) in [
            (["left", "h", "a"], Direction::Left),
            (["up", "k", "w"], Direction::Up),
            (["right", "l", "d"], Direction::Right),
            (["down", "j", "s"], Direction::Down),
        ] {
            for input in inputs {
                assert_eq!(parse_command(input), Some(Command::Move(direction)));
            }
        }
    }

    #[test]
    fn input_is_trimmed_and_case_insensitive() {
        assert_eq!(parse_command("  Up\n"), Some(Command::Move(Direction::Up)));
        assert_eq!(parse_command("Q"), Some(Command::Quit));
    }

    #[test]
    fn unknown_input_is_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("jump"), None);
    }
}
