//! Terminal game loop shared by every game the adapter runs.

use std::{
    cell::Cell,
    io::{BufRead, Write},
    rc::Rc,
    time::Duration,
};

use anyhow::{Context, Result};
use log::warn;
use subjunctive_core::{Direction, Resolution};
use subjunctive_system_floorpaint::Floorpaint;
use subjunctive_system_scheduler::{Clock, Scheduler, TaskId, Timing};
use subjunctive_system_think_green::Planet;

use crate::input::{parse_command, Command};

/// What the terminal loop needs from a game.
pub(crate) trait Game {
    /// Applies one player move.
    fn play(&mut self, direction: Direction) -> Result<Resolution>;

    /// Advances game time while the player is idle.
    fn idle(&mut self) -> Result<()> {
        Ok(())
    }

    /// Board as text.
    fn render(&self) -> String;

    /// One-line status shown under the board.
    fn status(&self) -> String;

    /// Whether the game has ended, won or lost.
    fn is_finished(&self) -> bool;
}

impl Game for Planet {
    fn play(&mut self, direction: Direction) -> Result<Resolution> {
        let turn = Planet::play(self, direction)?;
        Ok(turn.resolution)
    }

    fn idle(&mut self) -> Result<()> {
        Ok(self.tick()?)
    }

    fn render(&self) -> String {
        Planet::render(self)
    }

    fn status(&self) -> String {
        if self.is_over() {
            return format!("You died. Final score: {}", self.score());
        }
        format!(
            "score {}  combo x{}  tick {}",
            self.score(),
            self.combo(),
            self.tick_count()
        )
    }

    fn is_finished(&self) -> bool {
        self.is_over()
    }
}

impl Game for Floorpaint {
    fn play(&mut self, direction: Direction) -> Result<Resolution> {
        Ok(Floorpaint::play(self, direction)?)
    }

    fn render(&self) -> String {
        Floorpaint::render(self)
    }

    fn status(&self) -> String {
        if self.is_solved() {
            return format!("Solved in {} moves!", self.moves());
        }
        format!(
            "painted {}/{}  moves {}",
            self.painted_count(),
            self.floor_count(),
            self.moves()
        )
    }

    fn is_finished(&self) -> bool {
        self.is_solved()
    }
}

/// Summary returned when the loop ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    /// Moves the player entered.
    pub(crate) moves: usize,
    /// Whether the game reached its end rather than the player quitting.
    pub(crate) finished: bool,
}

/// Runs `game` against line input until it ends, the player quits, or input
/// runs out.
///
/// When `idle_tick` is set the game also advances on that period, checked
/// when the session starts and each time a line arrives.
pub(crate) fn run<G, R, W, C>(
    game: &mut G,
    input: R,
    mut output: W,
    clock: &C,
    idle_tick: Option<Duration>,
) -> Result<Outcome>
where
    G: Game + 'static,
    R: BufRead,
    W: Write,
    C: Clock + ?Sized,
{
    let mut scheduler = Scheduler::new();
    if let Some(period) = idle_tick {
        schedule_idle_tick(&mut scheduler, period);
    }
    let _ = scheduler.update_with_clock(clock, game);

    draw(game, &mut output)?;
    let mut outcome = Outcome {
        moves: 0,
        finished: game.is_finished(),
    };

    for line in input.lines() {
        if outcome.finished {
            break;
        }
        let line = line.context("failed to read input")?;
        let _ = scheduler.update_with_clock(clock, game);

        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Move(direction)) => {
                if !game.is_finished() {
                    let _ = game.play(direction)?;
                    outcome.moves += 1;
                }
            }
            None => {
                writeln!(output, "unrecognised input {:?}", line.trim())
                    .context("failed to write output")?;
                continue;
            }
        }

        draw(game, &mut output)?;
        outcome.finished = game.is_finished();
    }

    Ok(outcome)
}

/// Registers a periodic idle tick that cancels itself once the game refuses
/// to advance.
fn schedule_idle_tick<G: Game + 'static>(scheduler: &mut Scheduler<G>, period: Duration) {
    let handle = Rc::new(Cell::new(None::<TaskId>));
    let own_id = Rc::clone(&handle);
    let id = scheduler.call(
        move |game: &mut G, scheduler: &mut Scheduler<G>| {
            if let Err(error) = game.idle() {
                warn!("idle tick stopped: {error:#}");
                if let Some(id) = own_id.get() {
                    let _ = scheduler.cancel(id);
                }
            }
        },
        Timing::every(period),
    );
    handle.set(Some(id));
}

fn draw<G: Game, W: Write>(game: &G, output: &mut W) -> Result<()> {
    write!(output, "{}", game.render()).context("failed to write output")?;
    writeln!(output, "{}", game.status()).context("failed to write output")?;
    output.flush().context("failed to flush output")
}

#[cfg(test)]
mod tests {
    use subjunctive_system_scheduler::ManualClock;

    use super::*;

    const LEVEL: &str = "
        #####
        #@..#
        #####
    ";

    #[test]
    fn floorpaint_session_ends_when_solved() {
        let mut game = Floorpaint::load(LEVEL).expect("valid level");
        let mut output = Vec::new();
        let outcome = run(
            &mut game,
            "l\nbogus\nright\nleft\n".as_bytes(),
            &mut output,
            &ManualClock::default(),
            None,
        )
        .expect("session runs");

        assert_eq!(
            outcome,
            Outcome {
                moves: 2,
                finished: true
            }
        );
        let text = String::from_utf8(output).expect("utf-8 output");
        assert!(text.contains("unrecognised input \"bogus\""));
        assert!(text.trim_end().ends_with("Solved in 2 moves!"));
    }

    #[test]
    fn quit_stops_before_later_moves() {
        let mut game = Floorpaint::load(LEVEL).expect("valid level");
        let outcome = run(
            &mut game,
            "q\nright\n".as_bytes(),
            std::io::sink(),
            &ManualClock::default(),
            None,
        )
        .expect("session runs");
        assert_eq!(outcome.moves, 0);
        assert!(!outcome.finished);
        assert_eq!(game.painted_count(), 1);
    }

    #[test]
    fn idle_ticks_start_with_the_session() {
        let mut planet = Planet::new(5).expect("planet starts");
        let clock = ManualClock::starting_at(Duration::from_secs(60));
        let _ = run(
            &mut planet,
            "".as_bytes(),
            std::io::sink(),
            &clock,
            Some(Duration::from_secs(1)),
        )
        .expect("session runs");
        assert_eq!(planet.tick_count(), 1);
    }

    #[test]
    fn idle_ticks_keep_a_steady_period() {
        let mut planet = Planet::new(5).expect("planet starts");
        let mut scheduler = Scheduler::new();
        schedule_idle_tick(&mut scheduler, Duration::from_secs(1));
        for second in 0..=3 {
            let _ = scheduler.update(Duration::from_secs(second), &mut planet);
        }
        assert_eq!(planet.tick_count(), 4);
        assert_eq!(scheduler.len(), 1);
    }

    #[derive(Debug, Default)]
    struct Stalled {
        attempts: usize,
    }

    impl Game for Stalled {
        fn play(&mut self, _direction: Direction) -> Result<Resolution> {
            Ok(Resolution::Stay)
        }

        fn idle(&mut self) -> Result<()> {
            self.attempts += 1;
            anyhow::bail!("stalled")
        }

        fn render(&self) -> String {
            String::new()
        }

        fn status(&self) -> String {
            String::new()
        }

        fn is_finished(&self) -> bool {
            false
        }
    }

    #[test]
    fn failing_idle_tick_is_cancelled() {
        let mut game = Stalled::default();
        let mut scheduler = Scheduler::new();
        schedule_idle_tick(&mut scheduler, Duration::from_secs(1));
        for second in 0..=3 {
            let _ = scheduler.update(Duration::from_secs(second), &mut game);
        }
        assert_eq!(game.attempts, 1);
        assert!(scheduler.is_empty());
    }
}
