//! Wizard Math entry point
//!
//! Runs a headless session driven by the autopilot and reports the outcome.
//!
//! Options:
//!   --difficulty practice|normal|hard
//!   --tables 2,3,5
//!   --ops "⋅,+"        (also x * + - : /)
//!   --seed N
//!   --accuracy 0.0-1.0
//!   --think SECONDS
//!   --minutes N        (simulated time limit)
//!   --data DIR         (storage directory, native only)
//!   --stats            (print answer statistics as JSON)

use wizard_math::consts::*;
use wizard_math::persistence::{MemoryStorage, Storage};
use wizard_math::sim::{
    Autopilot, Difficulty, Effect, GameEvent, GamePhase, GameState, TickInput, tick,
};
use wizard_math::{HighScore, SessionConfig, Settings, platform};

/// Wall-clock length of one presented frame
const FRAME_DT: f32 = 1.0 / 30.0;

#[derive(Debug)]
struct Options {
    difficulty: Option<Difficulty>,
    tables: Option<Vec<u32>>,
    ops: Option<Vec<String>>,
    seed: u64,
    accuracy: f64,
    think: f32,
    minutes: f32,
    data_dir: Option<String>,
    stats: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            difficulty: None,
            tables: None,
            ops: None,
            seed: 1,
            accuracy: 0.9,
            think: 1.5,
            minutes: 30.0,
            data_dir: None,
            stats: false,
        }
    }
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut opts = Self::default();
        while let Some(arg) = args.next() {
            if arg == "--stats" {
                opts.stats = true;
                continue;
            }
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {}", arg))?;
            match arg.as_str() {
                "--difficulty" => {
                    opts.difficulty = Some(
                        Difficulty::from_str(&value)
                            .ok_or_else(|| format!("unknown difficulty '{}'", value))?,
                    );
                }
                "--tables" => {
                    let tables = value
                        .split(',')
                        .filter(|s| !s.trim().is_empty())
                        .map(|s| s.trim().parse::<u32>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| format!("bad --tables: {}", e))?;
                    opts.tables = Some(tables);
                }
                "--ops" => {
                    opts.ops = Some(value.split(',').map(|s| s.trim().to_string()).collect());
                }
                "--seed" => opts.seed = value.parse().map_err(|e| format!("bad --seed: {}", e))?,
                "--accuracy" => {
                    let accuracy: f64 =
                        value.parse().map_err(|e| format!("bad --accuracy: {}", e))?;
                    if !(0.0..=1.0).contains(&accuracy) {
                        return Err(format!("--accuracy must be in 0.0-1.0, got {}", value));
                    }
                    opts.accuracy = accuracy;
                }
                "--think" => opts.think = value.parse().map_err(|e| format!("bad --think: {}", e))?,
                "--minutes" => {
                    opts.minutes = value.parse().map_err(|e| format!("bad --minutes: {}", e))?;
                }
                "--data" => opts.data_dir = Some(value),
                other => return Err(format!("unknown option '{}'", other)),
            }
        }
        Ok(opts)
    }

    /// Command line selection layered over the last saved one
    fn session_config(&self, last: Option<&SessionConfig>) -> SessionConfig {
        let base = last.cloned().unwrap_or_default();
        let difficulty = self.difficulty.unwrap_or(base.difficulty);
        let tables = self.tables.clone().unwrap_or(base.selected_tables);
        match &self.ops {
            Some(ops) => {
                let symbols: Vec<&str> = ops.iter().map(String::as_str).collect();
                SessionConfig::from_symbols(difficulty, tables, &symbols)
            }
            None => SessionConfig::new(difficulty, tables, base.selected_operators),
        }
    }
}

/// Headless game instance
struct Game {
    state: GameState,
    pilot: Autopilot,
    settings: Settings,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(seed: u64, config: SessionConfig, settings: Settings, opts: &Options) -> Self {
        Self {
            state: GameState::new(seed, config),
            settings,
            pilot: Autopilot::new(seed ^ 0x5eed, opts.think, opts.accuracy),
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.input = self.pilot.next_input(&self.state, SIM_DT);
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in self.state.drain_events() {
                match &event {
                    GameEvent::Effect(effect) if !self.settings.allows(effect) => {}
                    GameEvent::Effect(Effect::Sound { cue, volume, .. }) => {
                        log::trace!("Sound {:?} at {:.2}", cue, self.settings.sfx_gain(*volume));
                    }
                    _ => log_event(&event),
                }
            }
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ChapterStarted { number, .. } => log::info!("Chapter {} begins", number),
        GameEvent::ChapterComplete { number } => log::info!("Chapter {} complete", number),
        GameEvent::ShowLore { text } => log::info!("{}", text.replace('\n', " ")),
        GameEvent::LevelUp { level, choice } => log::info!("Level {}: {}", level, choice),
        GameEvent::PlayerHit { hearts_left } => log::info!("Ouch! {} hearts left", hearts_left),
        GameEvent::QuestionShown { question, .. } => log::debug!("Question: {}", question),
        GameEvent::AnswerChecked { correct } => log::debug!("Answer correct: {}", correct),
        _ => log::trace!("{:?}", event),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_storage(opts: &Options) -> Box<dyn Storage> {
    use wizard_math::persistence::FileStorage;

    let dir = match &opts.data_dir {
        Some(dir) => Ok(std::path::PathBuf::from(dir)),
        None => FileStorage::default_dir(),
    };
    match dir.and_then(|dir| FileStorage::open(&dir)) {
        Ok(storage) => {
            log::info!("Using storage at {}", storage.path().display());
            Box::new(storage)
        }
        Err(e) => {
            log::warn!("Storage unavailable ({}), nothing will be saved", e);
            Box::new(MemoryStorage::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_storage(_opts: &Options) -> Box<dyn Storage> {
    use wizard_math::persistence::LocalStorage;

    match LocalStorage::open() {
        Some(storage) => Box::new(storage),
        None => {
            log::warn!("LocalStorage unavailable, nothing will be saved");
            Box::new(MemoryStorage::new())
        }
    }
}

fn main() {
    platform::init_logging();
    log::info!("Wizard Math (headless) starting...");

    let opts = match Options::parse(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let mut storage = open_storage(&opts);
    let mut settings = Settings::load(storage.as_ref());
    let mut high_score = HighScore::load(storage.as_ref());

    let config = opts.session_config(settings.last_session.as_ref());
    let mut game = Game::new(opts.seed, config.clone(), settings.clone(), &opts);

    let frames = (opts.minutes.max(0.0) * 60.0 / FRAME_DT) as u64;
    for _ in 0..frames {
        game.update(FRAME_DT);
        if game.state.is_over() {
            break;
        }
    }

    let state = &game.state;
    match state.phase {
        GamePhase::Victory => log::info!("Victory! score={}", state.score),
        GamePhase::GameOver => log::info!("Defeated. score={}", state.score),
        GamePhase::Playing => log::info!(
            "Time limit reached in chapter {}. score={}",
            state.chapters.index() + 1,
            state.score
        ),
    }

    let summary = state.stats.summary();
    log::info!(
        "{} answers, {} correct ({:.0}%), {:.0} ms average",
        summary.attempts,
        summary.correct,
        summary.accuracy * 100.0,
        summary.mean_time_ms
    );

    if high_score.submit(state.score, storage.as_mut()) {
        log::info!("New best score!");
    }

    settings.last_session = Some(config);
    settings.save(storage.as_mut());

    if opts.stats {
        match state.stats.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to export statistics: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, String> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_options() {
        let opts = parse(&["--difficulty", "hard", "--tables", "2, 7", "--ops", "x,+", "--stats"])
            .unwrap();
        assert_eq!(opts.difficulty, Some(Difficulty::Hard));
        assert_eq!(opts.tables, Some(vec![2, 7]));
        assert!(opts.stats);
        let config = opts.session_config(None);
        assert_eq!(config.selected_tables, vec![2, 7]);
        assert_eq!(config.selected_operators.len(), 2);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse(&["--speed", "3"]).is_err());
        assert!(parse(&["--seed"]).is_err());
        assert!(parse(&["--difficulty", "nightmare"]).is_err());
        assert!(parse(&["--accuracy", "NaN"]).is_err());
        assert!(parse(&["--accuracy", "1.5"]).is_err());
        assert_eq!(parse(&["--accuracy", "0.25"]).unwrap().accuracy, 0.25);
    }

    #[test]
    fn test_headless_game_advances() {
        let opts = Options::default();
        let mut game = Game::new(3, SessionConfig::default(), Settings::default(), &opts);
        for _ in 0..30 {
            game.update(FRAME_DT);
        }
        assert!(game.state.time_ticks >= 59);
    }
}
