use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::{self, BufRead, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use duplinha_core::{
    CardFace, CardId, EventStream, GameEvent, GameState, GridSize, MatchEngine, PairId,
    ShuffledCardGenerator,
};

/// Memory pairs in the terminal.
#[derive(Debug, Parser)]
#[command(name = "duplinha", version, about)]
struct Cli {
    /// Cards per board side (must be even).
    #[arg(long, default_value_t = 4)]
    grid_size: GridSize,

    /// Deal seed; defaults to a clock-derived one.
    #[arg(long)]
    seed: Option<u64>,

    /// How long both cards of an attempt stay visible, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    reveal_ms: u64,

    /// Print the event stream as JSON lines instead of rendered text.
    #[arg(long)]
    json: bool,

    /// Let a perfect-memory bot clear the board and exit.
    #[arg(long)]
    bot: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

type Engine = MatchEngine<ShuffledCardGenerator>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let seed = cli.seed.unwrap_or_else(seed_from_clock);
    log::info!("dealing with seed {seed}");

    let mut engine = MatchEngine::new(ShuffledCardGenerator::new(seed))
        .with_reveal_delay(Duration::from_millis(cli.reveal_ms));
    let mut events = engine.subscribe();

    engine
        .start_new_game(cli.grid_size)
        .await
        .context("dealing the first board")?;

    if cli.bot {
        run_bot(&mut engine, &mut events, cli.json).await
    } else {
        run_interactive(&mut engine, &mut events, cli.json).await
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

async fn run_interactive(engine: &mut Engine, events: &mut EventStream, json: bool) -> Result<()> {
    report_events(events, json)?;
    print_board(engine, json);
    if !json {
        println!("commands: flip <card> | undo | new [size] | state | quit");
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut parts = line.split_whitespace();
        let Some(token) = parts.next() else {
            continue;
        };
        if let Ok(card) = token.parse::<CardId>() {
            flip(engine, card).await;
        } else {
            match token {
                "flip" | "f" => {
                    match parts.next().and_then(|raw| raw.parse::<CardId>().ok()) {
                        Some(card) => flip(engine, card).await,
                        None => println!("usage: flip <card>"),
                    }
                }
                "undo" | "u" => match engine.undo_last_move() {
                    Ok(outcome) if !outcome.has_update() => println!("nothing to undo"),
                    Ok(_) => {}
                    Err(error) => println!("{error}"),
                },
                "new" | "n" => {
                    let grid_size = parts
                        .next()
                        .and_then(|raw| raw.parse().ok())
                        .or_else(|| engine.game_state().map(GameState::grid_size))
                        .unwrap_or(4);
                    if let Err(error) = engine.start_new_game(grid_size).await {
                        println!("{error}");
                    }
                }
                "state" | "s" => match engine.game_state() {
                    Some(state) => println!("{}", serde_json::to_string_pretty(state)?),
                    None => println!("no active session"),
                },
                "quit" | "q" => break,
                other => println!("unknown command {other:?} (flip/undo/new/state/quit)"),
            }
        }

        let completed = report_events(events, json)?;
        print_board(engine, json);
        if completed && !json {
            println!("board cleared! `new` deals another, `quit` leaves");
        }
    }
    Ok(())
}

async fn run_bot(engine: &mut Engine, events: &mut EventStream, json: bool) -> Result<()> {
    // The snapshot exposes every pair id, so a bot never misses.
    let Some(state) = engine.game_state() else {
        bail!("no active session");
    };

    let mut first_seen: HashMap<PairId, CardId> = HashMap::new();
    let mut plan = Vec::with_capacity(usize::from(state.total_pairs()));
    for card in state.cards() {
        match first_seen.entry(card.pair()) {
            Entry::Occupied(partner) => plan.push((*partner.get(), card.id())),
            Entry::Vacant(slot) => {
                slot.insert(card.id());
            }
        }
    }

    for (first, second) in plan {
        flip(engine, first).await;
        flip(engine, second).await;
        report_events(events, json)?;
        print_board(engine, json);
    }
    Ok(())
}

async fn flip(engine: &mut Engine, card: CardId) {
    match engine.try_flip_card(card).await {
        Ok(outcome) if !outcome.has_update() => println!("nothing to flip there"),
        Ok(_) => {}
        Err(error) => println!("{error}"),
    }
}

/// Drain pending events to stdout; reports whether a completion went by.
fn report_events(events: &mut EventStream, json: bool) -> Result<bool> {
    let mut completed = false;
    while let Ok(Some(event)) = events.try_next() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", describe(event));
        }
        if matches!(event, GameEvent::GameCompleted { .. }) {
            completed = true;
        }
    }
    Ok(completed)
}

fn describe(event: GameEvent) -> String {
    match event {
        GameEvent::GameStarted { grid_size } => format!("new {0}x{0} board dealt", grid_size),
        GameEvent::CardFlipped { card } => {
            format!("card {} shows pair {}", card.id(), card.pair())
        }
        GameEvent::MatchFound { first, second } => format!(
            "pair {}: cards {} and {} match",
            first.pair(),
            first.id(),
            second.id()
        ),
        GameEvent::MismatchFound => "no match, cards turned back".to_string(),
        GameEvent::GameCompleted { total_moves } => {
            format!("board cleared in {total_moves} moves")
        }
        GameEvent::MoveUndone => "last move undone".to_string(),
    }
}

fn print_board(engine: &Engine, json: bool) {
    if json {
        return;
    }
    if let Some(state) = engine.game_state() {
        println!("{}", render_board(state));
        println!(
            "moves {:>3}  matches {}/{}  time {}s",
            state.moves(),
            state.matches_found(),
            state.total_pairs(),
            state.elapsed().as_secs()
        );
    }
}

/// Face-down cards show their index, face-up ones their pair id, matched
/// ones lose the brackets.
fn render_board(state: &GameState) -> String {
    let side = usize::from(state.grid_size());
    let mut out = String::new();
    for row in 0..side {
        for column in 0..side {
            let card = &state.cards()[row * side + column];
            let cell = match card.face() {
                CardFace::Down => format!("[{:>2}]", card.id()),
                CardFace::Up => format!("({:>2})", card.pair()),
                CardFace::Matched => format!(" {:>2} ", card.pair()),
            };
            out.push_str(&cell);
            out.push(' ');
        }
        if row + 1 < side {
            out.push('\n');
        }
    }
    out
}
