use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::time;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::Serialize;

use board_game_traits::{Color, GameResult, Position as PositionTrait};

use sanjego::game::Player;
use sanjego::position::{Move, Position, Settings};
use sanjego::rules::Rules;
use sanjego::search::{self, NodeCounter, SearchSettings, Searcher};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// The outcome of solving one start position
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct SolveReport {
    height: u8,
    width: u8,
    rules: Rules,
    max_player_starts: bool,
    depth: u16,
    value: i32,
    pv: Vec<String>,
    nodes: u64,
    seconds: f64,
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({} starts): value {}, depth {}, pv {}",
            self.height,
            self.width,
            self.rules,
            if self.max_player_starts {
                "max player"
            } else {
                "min player"
            },
            self.value,
            self.depth,
            self.pv.join(" ")
        )?;
        write!(
            f,
            "\nSearched {} nodes in {:.2}s, {:.1} knps",
            self.nodes,
            self.seconds,
            self.nodes as f64 / (self.seconds * 1000.0).max(0.001)
        )
    }
}

pub fn main() -> Result<()> {
    let mut solve_command = Command::new("solve")
        .about("Solve the start position of a single board")
        .args(board_args())
        .args(search_args())
        .arg(
            Arg::new("maxDepth")
                .long("max-depth")
                .env("SANJEGO_MAX_DEPTH")
                .help("Stop searching at this depth, instead of searching every game to the end")
                .num_args(1)
                .value_parser(clap::value_parser!(u16)),
        );
    let mut sweep_command = Command::new("sweep")
        .about("Solve the start positions of all boards up to a given size")
        .arg(rules_arg())
        .args(search_args())
        .arg(
            Arg::new("maxWidth")
                .long("max-width")
                .env("SANJEGO_MAX_WIDTH")
                .help("Largest board width to solve")
                .num_args(1)
                .default_value("4")
                .value_parser(clap::value_parser!(u8).range(1..=26)),
        )
        .arg(
            Arg::new("maxArea")
                .long("max-area")
                .env("SANJEGO_MAX_AREA")
                .help("Largest number of squares to solve")
                .num_args(1)
                .default_value("12")
                .value_parser(clap::value_parser!(u16).range(1..=64)),
        );
    if cfg!(feature = "json") {
        solve_command = solve_command.arg(json_arg());
        sweep_command = sweep_command.arg(json_arg());
    }

    let app = Command::new("San Jego engine")
        .version("0.1")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("Print search progress to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("SANJEGO_LOGFILE")
                .global(true)
                .value_name("sanjego.log")
                .help("Name of debug logfile")
                .num_args(1),
        )
        .subcommand(solve_command)
        .subcommand(sweep_command)
        .subcommand(
            Command::new("play")
                .about("Play against the engine through the command line")
                .args(board_args())
                .args(search_args())
                .arg(
                    Arg::new("humanPlayer")
                        .long("human-player")
                        .help("Which player the human plays")
                        .num_args(1)
                        .default_value("2")
                        .value_parser(["1", "2"]),
                )
                .arg(depth_arg()),
        )
        .subcommand(
            Command::new("aimatch")
                .about("Watch the engine play against a random mover")
                .args(board_args())
                .args(search_args())
                .arg(
                    Arg::new("games")
                        .short('g')
                        .long("games")
                        .help("Number of games to play")
                        .num_args(1)
                        .default_value("10")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(depth_arg()),
        );
    let matches = app.get_matches();

    setup_logging(&matches)?;

    match matches.subcommand() {
        Some(("solve", matches)) => {
            let settings = game_settings(matches)?;
            let mut search_settings = search_settings(matches);
            if let Some(max_depth) = matches.get_one::<u16>("maxDepth") {
                search_settings = search_settings.max_depth(*max_depth);
            }
            let report = solve_start_position(settings, search_settings)?;
            print_reports(&[report], wants_json(matches))
        }
        Some(("sweep", matches)) => sweep(matches),
        Some(("play", matches)) => {
            let settings = game_settings(matches)?;
            let human_player = match matches.get_one::<String>("humanPlayer").map(|s| s.as_str()) {
                Some("1") => Color::White,
                _ => Color::Black,
            };
            let depth = matches.get_one::<u16>("depth").copied();
            play_human(
                Position::from_settings(settings)?,
                human_player,
                search_settings(matches),
                depth,
            )
        }
        Some(("aimatch", matches)) => {
            let settings = game_settings(matches)?;
            let games = *matches.get_one::<u32>("games").unwrap_or(&10);
            let depth = matches.get_one::<u16>("depth").copied();
            ai_vs_random(settings, search_settings(matches), depth, games)
        }
        Some((command, _)) => bail!("Unknown subcommand \"{}\"", command),
        None => bail!("No subcommand given"),
    }
}

fn board_args() -> [Arg; 4] {
    [
        Arg::new("height")
            .long("height")
            .env("SANJEGO_HEIGHT")
            .help("Number of rows on the board")
            .num_args(1)
            .default_value("3")
            .value_parser(clap::value_parser!(u8).range(1..=64)),
        Arg::new("width")
            .long("width")
            .env("SANJEGO_WIDTH")
            .help("Number of columns on the board")
            .num_args(1)
            .default_value("3")
            .value_parser(clap::value_parser!(u8).range(1..=26)),
        rules_arg(),
        Arg::new("minPlayerStarts")
            .long("min-player-starts")
            .env("SANJEGO_MIN_PLAYER_STARTS")
            .help("Let the minimising player, player two, make the first move")
            .action(ArgAction::SetTrue),
    ]
}

fn rules_arg() -> Arg {
    Arg::new("rules")
        .short('r')
        .long("rules")
        .env("SANJEGO_RULES")
        .help("Which rule set to play with")
        .num_args(1)
        .default_value("base")
        .value_parser(Rules::ALL.map(Rules::name))
}

fn search_args() -> [Arg; 2] {
    [
        Arg::new("noOrdering")
            .long("no-ordering")
            .env("SANJEGO_NO_ORDERING")
            .help("Search moves in the order they are generated, instead of sorting them heuristically")
            .action(ArgAction::SetTrue),
        Arg::new("ttEntries")
            .long("tt-entries")
            .env("SANJEGO_TT_ENTRIES")
            .help("Size of the transposition table, in entries. 0 disables the table")
            .num_args(1)
            .default_value("0")
            .value_parser(clap::value_parser!(usize)),
    ]
}

fn depth_arg() -> Arg {
    Arg::new("depth")
        .short('d')
        .long("depth")
        .help("Search depth of the engine. Searches to the end of the game by default")
        .num_args(1)
        .value_parser(clap::value_parser!(u16))
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print the results as json")
        .action(ArgAction::SetTrue)
}

fn setup_logging(matches: &ArgMatches) -> Result<()> {
    let stderr_level = if matches.get_flag("verbose") {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(
                        fern::log_file(log_file)
                            .with_context(|| format!("Failed to open logfile {}", log_file))?,
                    ),
            )
            .chain(
                fern::Dispatch::new()
                    .level(stderr_level)
                    .chain(io::stderr()),
            )
            .apply()?
    } else {
        log_dispatcher
            .level(stderr_level)
            .chain(io::stderr())
            .apply()?
    }
    Ok(())
}

fn parse_rules(matches: &ArgMatches) -> Result<Rules> {
    let name = matches
        .get_one::<String>("rules")
        .map(|s| s.as_str())
        .unwrap_or("base");
    Ok(Rules::from_str(name)?)
}

fn game_settings(matches: &ArgMatches) -> Result<Settings> {
    let height = *matches.get_one::<u8>("height").context("Missing board height")?;
    let width = *matches.get_one::<u8>("width").context("Missing board width")?;
    Ok(Settings::new(height, width)
        .rules(parse_rules(matches)?)
        .max_player_starts(!matches.get_flag("minPlayerStarts")))
}

fn search_settings(matches: &ArgMatches) -> SearchSettings {
    let tt_entries = matches.get_one::<usize>("ttEntries").copied().unwrap_or(0);
    SearchSettings::default()
        .move_ordering(!matches.get_flag("noOrdering"))
        .transposition_table(tt_entries)
}

fn wants_json(matches: &ArgMatches) -> bool {
    cfg!(feature = "json") && matches.get_flag("json")
}

fn solve_start_position(settings: Settings, search_settings: SearchSettings) -> Result<SolveReport> {
    let mut position = Position::from_settings(settings).with_context(|| {
        format!(
            "Cannot create a {}x{} {} game",
            settings.height, settings.width, settings.rules
        )
    })?;
    debug!("Solving\n{:?}", position);
    let depth = search::solve_depth(position.board().num_squares())
        .min(search_settings.get_max_depth().unwrap_or(u16::MAX));

    let start_time = time::Instant::now();
    let mut counter = NodeCounter::default();
    let result = search::solve_with_callback(&mut position, search_settings, &mut counter);
    debug_assert_eq!(result.nodes, counter.nodes);

    Ok(SolveReport {
        height: settings.height,
        width: settings.width,
        rules: settings.rules,
        max_player_starts: settings.max_player_starts,
        depth,
        value: result.value,
        pv: result.pv.iter().map(|mv| mv.to_string()).collect(),
        nodes: counter.nodes,
        seconds: start_time.elapsed().as_secs_f64(),
    })
}

fn sweep(matches: &ArgMatches) -> Result<()> {
    let rules = parse_rules(matches)?;
    let max_width = *matches.get_one::<u8>("maxWidth").unwrap_or(&4);
    let max_area = *matches.get_one::<u16>("maxArea").unwrap_or(&12);
    let search_settings = search_settings(matches);

    let mut all_settings = vec![];
    for width in 1..=max_width {
        for height in 1..=width {
            if height as u16 * width as u16 > max_area {
                continue;
            }
            let settings = Settings::new(height, width).rules(rules);
            all_settings.push(settings);
            // On boards with an even number of squares, the value for player two starting is the negated value
            if (height as u16 * width as u16) % 2 == 1 {
                all_settings.push(settings.max_player_starts(false));
            }
        }
    }
    info!("Solving {} start positions", all_settings.len());

    #[cfg(feature = "parallel")]
    let reports = all_settings
        .par_iter()
        .map(|settings| solve_start_position(*settings, search_settings.clone()))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let reports = all_settings
        .iter()
        .map(|settings| solve_start_position(*settings, search_settings.clone()))
        .collect::<Result<Vec<_>>>()?;

    print_reports(&reports, wants_json(matches))
}

fn print_reports(reports: &[SolveReport], json: bool) -> Result<()> {
    if json {
        #[cfg(feature = "json")]
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    for report in reports {
        println!("{}", report);
    }
    Ok(())
}

/// The engine's move, its value and the number of nodes searched to find it
fn engine_move(
    searcher: &mut Searcher<Position>,
    position: &mut Position,
    depth: Option<u16>,
) -> Option<(Move, i32, u64)> {
    let depth = depth.unwrap_or_else(|| search::solve_depth(position.board().num_squares()));
    let result = searcher.search(position, depth);
    info!("Searched to depth {}: {}", depth, result);
    let best_move = *result.best_move()?;
    Some((best_move, result.value, result.nodes))
}

/// Play a game against the engine through stdin
fn play_human(
    mut position: Position,
    human_player: Color,
    search_settings: SearchSettings,
    depth: Option<u16>,
) -> Result<()> {
    let mut searcher = Searcher::new(search_settings);
    let reader = io::stdin();
    let mut input = String::new();

    while position.game_result().is_none() {
        println!("Position:\n{:?}", position);
        let legal_moves = position.legal_moves();
        if position.side_to_move() == human_player {
            if legal_moves == [Move::Skip] {
                println!("You cannot move, and must skip");
                position.do_move(Move::Skip);
                continue;
            }
            println!("Type your move (a1-b1):");
            // Loop until user enters a valid move
            let mv = loop {
                input.clear();
                if reader.read_line(&mut input)? == 0 {
                    bail!("Reached end of input before the game was over");
                }
                match Move::from_str(input.trim()) {
                    Ok(mv) if legal_moves.contains(&mv) => break mv,
                    Ok(mv) => {
                        let legal_move_strings: Vec<String> =
                            legal_moves.iter().map(|mv| mv.to_string()).collect();
                        println!(
                            "Move {} is illegal! Legal moves: {}",
                            mv,
                            legal_move_strings.join(", ")
                        );
                        println!("Try again: ");
                    }
                    Err(error) => println!("{}, try again.", error),
                }
            };
            position.do_move(mv);
        } else {
            let (best_move, value, nodes) = engine_move(&mut searcher, &mut position, depth)
                .context("The engine found no move in an ongoing game")?;
            println!("Computer played {} with value {}", best_move, value);
            println!("Searched {} nodes", nodes);
            position.do_move(best_move);
        }
        io::stdout().flush()?;
    }

    match position.game_result() {
        Some(GameResult::WhiteWin) => println!("Player 1 won! Position:\n{:?}", position),
        Some(GameResult::BlackWin) => println!("Player 2 won! Position:\n{:?}", position),
        Some(GameResult::Draw) | None => println!("The game was drawn! Position:\n{:?}", position),
    }
    Ok(())
}

fn ai_vs_random(
    settings: Settings,
    search_settings: SearchSettings,
    depth: Option<u16>,
    games: u32,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut searcher = Searcher::new(search_settings);
    let (mut engine_wins, mut draws, mut random_wins) = (0, 0, 0);
    let mut total_nodes = 0;

    for game in 0..games {
        let engine_player = if game % 2 == 0 {
            Color::White
        } else {
            Color::Black
        };
        let mut position = Position::from_settings(settings)?;
        let mut moves = vec![];
        let mut nodes = 0;
        while position.game_result().is_none() {
            let mv = if position.side_to_move() == engine_player {
                engine_move(&mut searcher, &mut position, depth).map(|(mv, _, move_nodes)| {
                    nodes += move_nodes;
                    mv
                })
            } else {
                search::random_move(&position, &mut rng)
            };
            let mv = mv.context("No legal moves in an ongoing game")?;
            moves.push(mv.to_string());
            position.do_move(mv);
        }

        let result = position.game_result();
        match (result, engine_player) {
            (Some(GameResult::Draw), _) => draws += 1,
            (Some(GameResult::WhiteWin), Color::White)
            | (Some(GameResult::BlackWin), Color::Black) => engine_wins += 1,
            _ => random_wins += 1,
        }
        total_nodes += nodes;
        println!(
            "Game {}, engine as {}: {} with value {} after {}",
            game + 1,
            engine_player.player_name(),
            match result {
                Some(GameResult::WhiteWin) => "player 1 won",
                Some(GameResult::BlackWin) => "player 2 won",
                _ => "draw",
            },
            position.value(),
            moves.join(" ")
        );
        println!("Searched {} nodes", nodes);
    }

    println!(
        "Engine won {}, drew {} and lost {} games",
        engine_wins, draws, random_wins
    );
    println!("Searched {} nodes in total", total_nodes);
    if random_wins > 0 && depth.is_none() {
        warn!("A random mover beat the engine searching to the end of the game");
    }
    Ok(())
}
