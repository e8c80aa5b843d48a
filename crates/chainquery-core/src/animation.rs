//! The landing-screen terminal animation.
//!
//! A three-phase cycle, `typing → generating → output → typing`, stepping
//! through [`LANDING_EXAMPLES`] forever. Every transition is a timer; the
//! machine is advanced against an injectable [`Clock`] so tests can move time
//! deterministically.

use std::{
  cell::Cell,
  time::{Duration, Instant},
};

// ─── Clocks ──────────────────────────────────────────────────────────────────

/// Monotonic time source, measured from an arbitrary fixed origin.
pub trait Clock {
  fn now(&self) -> Duration;
}

/// Wall-clock time elapsed since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
  origin: Instant,
}

impl SystemClock {
  pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for SystemClock {
  fn default() -> Self { Self::new() }
}

impl Clock for SystemClock {
  fn now(&self) -> Duration { self.origin.elapsed() }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
  now: Cell<Duration>,
}

impl ManualClock {
  pub fn new() -> Self { Self::default() }

  pub fn advance(&self, by: Duration) { self.now.set(self.now.get() + by); }
}

impl Clock for ManualClock {
  fn now(&self) -> Duration { self.now.get() }
}

// ─── Script ──────────────────────────────────────────────────────────────────

/// One scripted question and the SQL "generated" for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
  pub input:  &'static str,
  pub output: &'static str,
}

pub const LANDING_EXAMPLES: &[Example] = &[
  Example {
    input:  "Show me top 10 SOL holders",
    output: "SELECT wallet, balance FROM solana.accounts ORDER BY balance DESC LIMIT 10",
  },
  Example {
    input:  "Daily DEX trading volume",
    output: "SELECT date_trunc('day', block_time), SUM(amount_usd) FROM dex.trades GROUP BY 1",
  },
  Example {
    input:  "NFT sales in the last 24h",
    output: "SELECT * FROM nft.trades WHERE block_time > now() - interval '24' hour",
  },
];

/// Delay between typed input characters.
pub const TYPE_INTERVAL: Duration = Duration::from_millis(50);
/// Pause once the input is fully typed.
pub const TYPED_PAUSE: Duration = Duration::from_millis(500);
/// Time spent in the generating phase.
pub const GENERATING_DELAY: Duration = Duration::from_millis(800);
/// Delay between output chunks.
pub const OUTPUT_INTERVAL: Duration = Duration::from_millis(20);
/// Characters revealed per output chunk.
pub const OUTPUT_CHUNK: usize = 2;
/// How long the finished output stays on screen.
pub const OUTPUT_HOLD: Duration = Duration::from_millis(3000);

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Typing,
  Generating,
  Output,
}

/// Animation state. Call [`tick`](Self::tick) as often as convenient; every
/// timer that has expired since the last call fires in order.
#[derive(Debug, Clone)]
pub struct TerminalAnimation {
  examples: &'static [Example],
  index:    usize,
  phase:    Phase,
  typed:    usize,
  shown:    usize,
  deadline: Duration,
}

impl TerminalAnimation {
  /// Start at the first example, typing, with the first timer armed
  /// relative to `start`.
  pub fn new(examples: &'static [Example], start: Duration) -> Self {
    let mut animation = Self {
      examples,
      index: 0,
      phase: Phase::Typing,
      typed: 0,
      shown: 0,
      deadline: start,
    };
    animation.deadline = start + animation.delay();
    animation
  }

  /// Start the default landing script at the clock's current time.
  pub fn landing(clock: &impl Clock) -> Self { Self::new(LANDING_EXAMPLES, clock.now()) }

  pub fn tick(&mut self, clock: &impl Clock) { self.advance_to(clock.now()); }

  /// Fire every timer due at or before `now`.
  pub fn advance_to(&mut self, now: Duration) {
    if self.examples.is_empty() {
      return;
    }
    while self.deadline <= now {
      self.step();
      self.deadline += self.delay();
    }
  }

  fn current(&self) -> Option<&Example> { self.examples.get(self.index) }

  fn input_len(&self) -> usize { self.current().map_or(0, |e| e.input.chars().count()) }

  fn output_len(&self) -> usize { self.current().map_or(0, |e| e.output.chars().count()) }

  /// The action the pending timer performs.
  fn step(&mut self) {
    match self.phase {
      Phase::Typing if self.typed < self.input_len() => self.typed += 1,
      Phase::Typing => self.phase = Phase::Generating,
      Phase::Generating => self.phase = Phase::Output,
      Phase::Output if self.shown < self.output_len() => {
        self.shown = (self.shown + OUTPUT_CHUNK).min(self.output_len());
      }
      Phase::Output => {
        self.index = (self.index + 1) % self.examples.len();
        self.typed = 0;
        self.shown = 0;
        self.phase = Phase::Typing;
      }
    }
  }

  /// Delay until the next timer, given the current state.
  fn delay(&self) -> Duration {
    match self.phase {
      Phase::Typing if self.typed < self.input_len() => TYPE_INTERVAL,
      Phase::Typing => TYPED_PAUSE,
      Phase::Generating => GENERATING_DELAY,
      Phase::Output if self.shown < self.output_len() => OUTPUT_INTERVAL,
      Phase::Output => OUTPUT_HOLD,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn example_index(&self) -> usize { self.index }

  pub fn displayed_input(&self) -> &str {
    self.current().map_or("", |e| char_prefix(e.input, self.typed))
  }

  pub fn displayed_output(&self) -> &str {
    self.current().map_or("", |e| char_prefix(e.output, self.shown))
  }

  /// Whether the output pane should be drawn.
  pub fn shows_output(&self) -> bool {
    self.phase == Phase::Output || !self.displayed_output().is_empty()
  }
}

fn char_prefix(s: &str, chars: usize) -> &str {
  s.char_indices().nth(chars).map_or(s, |(i, _)| &s[..i])
}

// ─── Placeholder rotation ────────────────────────────────────────────────────

/// Placeholders shown in the empty query input.
pub const PLACEHOLDER_EXAMPLES: &[&str] = &[
  "Show me the top 10 USDC holders on Solana...",
  "Get daily transaction volume for Jupiter DEX...",
  "Find the largest NFT sales in the last 24 hours...",
  "Analyze SOL staking rewards by validator...",
];

/// How long each placeholder is shown before rotating.
pub const PLACEHOLDER_INTERVAL: Duration = Duration::from_secs(4);

/// The placeholder showing `elapsed` after the input appeared.
pub fn placeholder_at(elapsed: Duration) -> &'static str {
  let step = (elapsed.as_millis() / PLACEHOLDER_INTERVAL.as_millis()) as usize;
  PLACEHOLDER_EXAMPLES
    .get(step % PLACEHOLDER_EXAMPLES.len())
    .copied()
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  #[test]
  fn types_one_character_per_interval() {
    let clock = ManualClock::new();
    let mut anim = TerminalAnimation::landing(&clock);
    assert_eq!(anim.phase(), Phase::Typing);
    assert_eq!(anim.displayed_input(), "");

    clock.advance(ms(49));
    anim.tick(&clock);
    assert_eq!(anim.displayed_input(), "");

    clock.advance(ms(1));
    anim.tick(&clock);
    assert_eq!(anim.displayed_input(), "S");

    clock.advance(ms(100));
    anim.tick(&clock);
    assert_eq!(anim.displayed_input(), "Sho");
  }

  #[test]
  fn full_cycle_timing_for_first_example() {
    let clock = ManualClock::new();
    let mut anim = TerminalAnimation::landing(&clock);
    let input_len = LANDING_EXAMPLES[0].input.len() as u64;
    let output_len = LANDING_EXAMPLES[0].output.len() as u64;

    // Input fully typed, pause not yet over.
    clock.advance(ms(50 * input_len));
    anim.tick(&clock);
    assert_eq!(anim.displayed_input(), LANDING_EXAMPLES[0].input);
    assert_eq!(anim.phase(), Phase::Typing);

    clock.advance(ms(499));
    anim.tick(&clock);
    assert_eq!(anim.phase(), Phase::Typing);
    clock.advance(ms(1));
    anim.tick(&clock);
    assert_eq!(anim.phase(), Phase::Generating);
    assert!(!anim.shows_output());

    clock.advance(ms(800));
    anim.tick(&clock);
    assert_eq!(anim.phase(), Phase::Output);
    assert!(anim.shows_output());
    assert_eq!(anim.displayed_output(), "");

    clock.advance(ms(20));
    anim.tick(&clock);
    assert_eq!(anim.displayed_output(), "SE");

    // Remaining chunks.
    let chunks = output_len.div_ceil(2);
    clock.advance(ms(20 * (chunks - 1)));
    anim.tick(&clock);
    assert_eq!(anim.displayed_output(), LANDING_EXAMPLES[0].output);

    clock.advance(ms(2999));
    anim.tick(&clock);
    assert_eq!(anim.example_index(), 0);

    clock.advance(ms(1));
    anim.tick(&clock);
    assert_eq!(anim.example_index(), 1);
    assert_eq!(anim.phase(), Phase::Typing);
    assert_eq!(anim.displayed_input(), "");
    assert_eq!(anim.displayed_output(), "");
  }

  #[test]
  fn example_index_wraps() {
    let clock = ManualClock::new();
    let mut anim = TerminalAnimation::landing(&clock);
    let mut seen = vec![anim.example_index()];

    // Step in small increments so every boundary is observed.
    for _ in 0..20_000 {
      clock.advance(ms(10));
      anim.tick(&clock);
      if seen.last() != Some(&anim.example_index()) {
        seen.push(anim.example_index());
      }
      if seen.len() == 5 {
        break;
      }
    }
    assert_eq!(seen, vec![0, 1, 2, 0, 1]);
  }

  #[test]
  fn large_jump_fires_every_due_timer() {
    let stepwise_clock = ManualClock::new();
    let mut stepwise = TerminalAnimation::landing(&stepwise_clock);
    let jump_clock = ManualClock::new();
    let mut jumped = TerminalAnimation::landing(&jump_clock);

    for _ in 0..700 {
      stepwise_clock.advance(ms(10));
      stepwise.tick(&stepwise_clock);
    }
    jump_clock.advance(ms(7000));
    jumped.tick(&jump_clock);

    assert_eq!(stepwise.phase(), jumped.phase());
    assert_eq!(stepwise.example_index(), jumped.example_index());
    assert_eq!(stepwise.displayed_input(), jumped.displayed_input());
    assert_eq!(stepwise.displayed_output(), jumped.displayed_output());
  }

  #[test]
  fn empty_script_is_inert() {
    let mut anim = TerminalAnimation::new(&[], Duration::ZERO);
    anim.advance_to(Duration::from_secs(60));
    assert_eq!(anim.displayed_input(), "");
    assert_eq!(anim.phase(), Phase::Typing);
  }

  #[test]
  fn placeholder_rotates_every_four_seconds() {
    assert_eq!(placeholder_at(Duration::ZERO), PLACEHOLDER_EXAMPLES[0]);
    assert_eq!(placeholder_at(ms(3999)), PLACEHOLDER_EXAMPLES[0]);
    assert_eq!(placeholder_at(ms(4000)), PLACEHOLDER_EXAMPLES[1]);
    assert_eq!(placeholder_at(ms(16_000)), PLACEHOLDER_EXAMPLES[0]);
  }
}
