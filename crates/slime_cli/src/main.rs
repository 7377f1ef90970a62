use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use slime_control::{CommandSource, KeeperAutopilot, ScriptStep, ScriptedInput};
use slime_core::hud::{slot_cost_text, slot_state_label, ResourceHud};
use slime_core::{
    ActorId, Command, CommandEnvelope, CommandId, Event, EventLevel, GameContent, GameState,
    Interactable, MessagePanel, VisualBoard,
};
use slime_world::{build_initial_state, load_content};
use std::io::BufRead;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "slime_cli", about = "Slime incubation sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 10)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Print every event as one JSON line instead of status lines.
        #[arg(long)]
        events_json: bool,
        /// Replay timed commands from a JSON file instead of the autopilot.
        #[arg(long)]
        script: Option<String>,
    },
    /// Drive one keeper by hand from stdin.
    Play {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn setup(content_dir: &str, seed: Option<u64>) -> Result<(GameContent, GameState, ChaCha8Rng)> {
    let content = load_content(content_dir)?;
    let seed = seed.unwrap_or_else(rand::random);
    let state = build_initial_state(&content, seed)?;
    Ok((content, state, ChaCha8Rng::seed_from_u64(seed)))
}

fn keeper(content: &GameContent) -> Result<ActorId> {
    match content.actors.first() {
        Some(actor) => Ok(actor.clone()),
        None => bail!("content defines no actors"),
    }
}

// ---------------------------------------------------------------------------
// Headless run
// ---------------------------------------------------------------------------

fn load_script(path: &str) -> Result<ScriptedInput> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading script: {path}"))?;
    let steps: Vec<ScriptStep> =
        serde_json::from_str(&json).with_context(|| format!("parsing script: {path}"))?;
    Ok(ScriptedInput::new(steps))
}

fn run(
    ticks: u64,
    seed: Option<u64>,
    content_dir: &str,
    print_every: u64,
    event_level: EventLevel,
    events_json: bool,
    script: Option<String>,
) -> Result<()> {
    let (content, mut state, mut rng) = setup(content_dir, seed)?;
    let mut source: Box<dyn CommandSource> = match script {
        Some(path) => Box::new(load_script(&path)?),
        None => Box::new(KeeperAutopilot::new(keeper(&content)?)),
    };
    let mut visuals = VisualBoard::default();
    let mut messages: Vec<String> = Vec::new();
    let mut next_command_id = 0u64;

    if !events_json {
        println!(
            "Starting simulation: ticks={ticks} seed={} species={} bases={} content_version={}",
            state.meta.seed,
            content.species.len(),
            state.slots.len(),
            content.content_version,
        );
        println!("{}", "-".repeat(80));
    }

    for _ in 0..ticks {
        let commands = source.generate_commands(&state, &content, &mut next_command_id);
        let events = slime_core::tick(
            &mut state,
            &commands,
            &content,
            &mut rng,
            &mut messages,
            &mut visuals,
            event_level,
        );

        if events_json {
            for event in &events {
                println!("{}", serde_json::to_string(event).context("encoding event")?);
            }
            messages.clear();
            continue;
        }

        for text in messages.drain(..) {
            println!("[tick={:04}]  > {text}", state.meta.tick - 1);
        }
        for event in &events {
            if let Event::SlimeEvolved {
                slot_id,
                stage_name,
                ..
            } = &event.event
            {
                println!("*** {slot_id} evolved into {stage_name} at tick={:04} ***", event.tick);
            }
        }
        if print_every > 0 && state.meta.tick % print_every == 0 {
            print_status(&state, &content);
        }
    }

    if !events_json {
        println!("{}", "-".repeat(80));
        println!("Done. Final state at tick {}:", state.meta.tick);
        print_status(&state, &content);
    }
    Ok(())
}

fn print_status(state: &GameState, content: &GameContent) {
    let running = state.slots.values().filter(|slot| slot.is_busy()).count();
    let finished = state
        .slots
        .values()
        .filter(|slot| slot.state() == slime_core::SlimeSlotState::Finished)
        .count();
    let inventory: Vec<String> = content
        .actors
        .iter()
        .filter_map(|id| state.actors.get(id))
        .flat_map(|actor| actor.ledger.iter())
        .filter(|(_, amount)| *amount > 0)
        .map(|(kind, amount)| format!("{kind}={amount}"))
        .collect();

    println!(
        "[tick={:04}]  bases={}  running={running}  finished={finished}  pending_bursts={}  inventory=[{}]",
        state.meta.tick,
        state.slots.len(),
        state.scheduler.len(),
        inventory.join(", "),
    );
}

// ---------------------------------------------------------------------------
// Interactive play
// ---------------------------------------------------------------------------

const PLAY_HELP: &str = "\
commands:
  near <id>    step into range of an incubator, base or resource node
  leave <id>   step out of range
  e            interact with everything in range
  wait [n]     let n ticks pass (default 1)
  status       show bases, costs and inventory
  quit";

fn resolve_target(state: &GameState, id: &str) -> Option<Interactable> {
    let id = id.to_string();
    if state.incubators.contains_key(&slime_core::IncubatorId(id.clone())) {
        return Some(Interactable::Incubator(slime_core::IncubatorId(id)));
    }
    if state.slots.contains_key(&slime_core::SlotId(id.clone())) {
        return Some(Interactable::Slot(slime_core::SlotId(id)));
    }
    if state.resource_nodes.contains_key(&slime_core::NodeId(id.clone())) {
        return Some(Interactable::Node(slime_core::NodeId(id)));
    }
    None
}

/// Host-side surfaces for play mode.
struct Screen {
    panel: MessagePanel,
    hud: ResourceHud,
    visuals: VisualBoard,
    shown: Option<String>,
}

impl Screen {
    fn refresh(&mut self, state: &GameState, actor: &ActorId) {
        self.panel.update(state.meta.tick);
        let current = self.panel.current().map(str::to_string);
        if current != self.shown {
            if let Some(text) = &current {
                println!("  | {text}");
            }
            self.shown = current;
        }
        if let Some(actor) = state.actors.get(actor) {
            if self.hud.refresh(&actor.ledger) {
                let held: Vec<&str> = self
                    .hud
                    .lines()
                    .iter()
                    .map(String::as_str)
                    .filter(|line| !line.ends_with(": 0"))
                    .collect();
                if !held.is_empty() {
                    println!("  $ {}", held.join("  "));
                }
            }
        }
    }

    fn print_bases(&self, state: &GameState, actor: &ActorId) {
        let Some(keeper) = state.actors.get(actor) else {
            return;
        };
        for slot in state.slots.values() {
            let visual = self
                .visuals
                .active(slot.id())
                .map_or("-".to_string(), ToString::to_string);
            println!(
                "  {} ({}) [{}] visual={visual}",
                slot.name(),
                slot.id(),
                slot_state_label(slot.state()),
            );
            for line in slot_cost_text(slot, &keeper.ledger).lines() {
                println!("      {line}");
            }
        }
        for line in self.hud.lines() {
            println!("  {line}");
        }
        if self.panel.pending() > 0 {
            println!("  ({} more messages queued)", self.panel.pending());
        }
    }
}

fn play(seed: Option<u64>, content_dir: &str) -> Result<()> {
    let (content, mut state, mut rng) = setup(content_dir, seed)?;
    let actor = keeper(&content)?;
    let mut screen = Screen {
        panel: MessagePanel::new(content.constants.message_display_ticks),
        hud: ResourceHud::default(),
        visuals: VisualBoard::default(),
        shown: None,
    };
    let mut next_command_id = 0u64;

    println!("Playing as {actor}. Type 'help' for commands.");
    let interactables: Vec<String> = state
        .incubators
        .keys()
        .map(ToString::to_string)
        .chain(state.slots.keys().map(ToString::to_string))
        .chain(state.resource_nodes.keys().map(ToString::to_string))
        .collect();
    println!("In the world: {}", interactables.join(", "));
    screen.refresh(&state, &actor);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let (command, idle_ticks) = match parse_input(&line, &state, &content) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Help => {
                println!("{PLAY_HELP}");
                continue;
            }
            Input::Status => {
                screen.print_bases(&state, &actor);
                continue;
            }
            Input::Invalid(reason) => {
                println!("{reason}");
                continue;
            }
            Input::Act(command) => (Some(command), 0),
            Input::Wait(n) => (None, n),
        };

        if let Some(command) = command {
            let envelope = CommandEnvelope {
                id: CommandId(format!("cmd_{next_command_id:06}")),
                issued_by: actor.clone(),
                issued_tick: state.meta.tick,
                execute_at_tick: state.meta.tick,
                command,
            };
            next_command_id += 1;
            step(&mut state, &[envelope], &content, &mut rng, &mut screen);
            screen.refresh(&state, &actor);
        }
        for _ in 0..idle_ticks {
            step(&mut state, &[], &content, &mut rng, &mut screen);
            screen.refresh(&state, &actor);
        }
    }
    Ok(())
}

/// One line of play-mode input.
#[derive(Debug)]
enum Input {
    Blank,
    Quit,
    Help,
    Status,
    Act(Command),
    Wait(u64),
    Invalid(String),
}

/// Longest `wait` accepted in one line, in seconds of sim time.
const MAX_WAIT_SECONDS: u64 = 60;

fn parse_input(line: &str, state: &GameState, content: &GameContent) -> Input {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Input::Blank;
    };
    match (verb, words.next()) {
        ("quit" | "q", _) => Input::Quit,
        ("help" | "h", _) => Input::Help,
        ("status" | "s", _) => Input::Status,
        ("e" | "interact", _) => Input::Act(Command::Interact),
        ("wait" | "w", None) => Input::Wait(1),
        ("wait" | "w", Some(n)) => {
            let max = u64::from(content.constants.ticks_per_second) * MAX_WAIT_SECONDS;
            match n.parse::<u64>() {
                Ok(ticks) if ticks <= max => Input::Wait(ticks),
                Ok(_) => Input::Invalid(format!("wait at most {max} ticks at a time")),
                Err(_) => Input::Invalid("wait takes a number of ticks".to_string()),
            }
        }
        ("near" | "leave", Some(id)) => match resolve_target(state, id) {
            None => Input::Invalid(format!("nothing called '{id}' here")),
            Some(target) if verb == "near" => Input::Act(Command::EnterRange { target }),
            Some(target) => Input::Act(Command::ExitRange { target }),
        },
        _ => Input::Invalid(format!("unknown command '{line}'; try 'help'")),
    }
}

fn step(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    screen: &mut Screen,
) {
    let Screen { panel, visuals, .. } = screen;
    let events = slime_core::tick(
        state,
        commands,
        content,
        rng,
        panel,
        visuals,
        EventLevel::Normal,
    );
    for event in &events {
        tracing::debug!(id = %event.id, tick = event.tick, event = ?event.event, "event");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            content_dir,
            print_every,
            event_level,
            events_json,
            script,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(
                ticks,
                seed,
                &content_dir,
                print_every,
                level,
                events_json,
                script,
            )?;
        }
        Commands::Play { seed, content_dir } => play(seed, &content_dir)?,
    }
    Ok(())
}
