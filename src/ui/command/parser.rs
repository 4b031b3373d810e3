use super::{BreakpointCommand, Command, CommandError, CommandResult, WatchCommand};
use chumsky::error::Rich;
use chumsky::prelude::{any, choice, end, just};
use chumsky::{extra, text, Boxed, Parser};

pub const LAUNCH_COMMAND: &str = "launch";
pub const RUN_COMMAND: &str = "run";
pub const RUN_COMMAND_SHORT: &str = "r";
pub const REVERSE_COMMAND: &str = "reverse";
pub const REVERSE_COMMAND_SHORT: &str = "rc";
pub const STEP_COMMAND: &str = "step";
pub const STEP_COMMAND_SHORT: &str = "s";
pub const BACKSTEP_COMMAND: &str = "backstep";
pub const BACKSTEP_COMMAND_SHORT: &str = "bs";
pub const NEXT_COMMAND: &str = "next";
pub const NEXT_COMMAND_SHORT: &str = "n";
pub const PREVIOUS_COMMAND: &str = "previous";
pub const PREVIOUS_COMMAND_SHORT: &str = "prev";
pub const FINISH_COMMAND: &str = "finish";
pub const START_COMMAND: &str = "start";
pub const RESTART_COMMAND: &str = "restart";
pub const BREAK_COMMAND: &str = "break";
pub const BREAK_COMMAND_SHORT: &str = "b";
pub const BREAK_REMOVE_SUBCOMMAND: &str = "remove";
pub const BREAK_REMOVE_SUBCOMMAND_SHORT: &str = "r";
pub const BREAK_ALL_KEY: &str = "all";
pub const BREAK_INFO_SUBCOMMAND: &str = "info";
pub const FRAME_COMMAND: &str = "frame";
pub const FRAME_COMMAND_SHORT: &str = "f";
pub const BACKTRACE_COMMAND: &str = "backtrace";
pub const BACKTRACE_COMMAND_SHORT: &str = "bt";
pub const PRINT_COMMAND: &str = "print";
pub const PRINT_COMMAND_SHORT: &str = "p";
pub const WATCH_COMMAND: &str = "watch";
pub const WATCH_COMMAND_SHORT: &str = "w";
pub const WATCH_REMOVE_SUBCOMMAND: &str = "remove";
pub const WATCH_REMOVE_SUBCOMMAND_SHORT: &str = "r";
pub const WATCH_CLEAR_SUBCOMMAND: &str = "clear";
pub const WATCH_INFO_SUBCOMMAND: &str = "info";
pub const WATCH_REFRESH_SUBCOMMAND: &str = "refresh";
pub const QUIT_COMMAND: &str = "quit";
pub const QUIT_COMMAND_SHORT: &str = "q";
pub const KILL_COMMAND: &str = "kill";
pub const EXIT_COMMAND: &str = "exit";
pub const HELP_COMMAND: &str = "help";
pub const HELP_COMMAND_SHORT: &str = "h";

type Err<'a> = extra::Err<Rich<'a, char>>;

/// Module name of a breakpoint: `Foo`, `foo` or `foo.ml` all mean module `Foo`.
pub fn module<'a>() -> impl Parser<'a, &'a str, String, Err<'a>> + Clone {
    text::ident()
        .then_ignore(just(".ml").or_not())
        .map(|name: &str| {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .padded()
        .labelled("module name")
}

fn number<'a, T>() -> impl Parser<'a, &'a str, T, Err<'a>> + Clone
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    text::int(10).from_str().unwrapped().padded()
}

pub fn brkpt_at_line<'a>() -> impl Parser<'a, &'a str, BreakpointCommand, Err<'a>> {
    module()
        .then(number::<usize>())
        .then(number::<usize>().or_not())
        .map(|((module, line), column)| BreakpointCommand::Add {
            module,
            line,
            column: column.unwrap_or(1),
        })
}

/// Rest of the line, at least one character, surrounding whitespaces trimmed.
fn rest<'a>() -> impl Parser<'a, &'a str, String, Err<'a>> + Clone {
    any()
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.trim().to_string())
        .filter(|s: &String| !s.is_empty())
}

fn command<'a, I>(ctx: &'static str, inner: I) -> Boxed<'a, 'a, &'a str, Command, Err<'a>>
where
    I: Parser<'a, &'a str, Command, Err<'a>> + 'a,
{
    inner.then_ignore(end()).labelled(ctx).boxed()
}

impl Command {
    /// Parse input string into command.
    pub fn parse(input: &str) -> CommandResult<Command> {
        if input.trim().is_empty() {
            return Ok(Command::SkipInput);
        }

        Self::parser()
            .parse(input)
            .into_result()
            .map_err(|e| CommandError::Parsing(e[0].to_string()))
    }

    fn parser<'a>() -> impl Parser<'a, &'a str, Command, Err<'a>> {
        let op = |sym| just(sym).padded();
        let op2 = |full, short| op(full).or(op(short));
        // command followed by an argument, at least one whitespace between them
        let op_arg = |full, short| {
            just(full)
                .or(just(short))
                .then(text::whitespace().at_least(1))
                .padded()
        };

        let launch = op(LAUNCH_COMMAND).to(Command::Launch);
        let run = op2(RUN_COMMAND, RUN_COMMAND_SHORT).to(Command::Run);
        let reverse = op2(REVERSE_COMMAND, REVERSE_COMMAND_SHORT).to(Command::Reverse);
        let step = op2(STEP_COMMAND, STEP_COMMAND_SHORT).to(Command::Step);
        let backstep = op2(BACKSTEP_COMMAND, BACKSTEP_COMMAND_SHORT).to(Command::Backstep);
        let next = op2(NEXT_COMMAND, NEXT_COMMAND_SHORT).to(Command::Next);
        let previous = op2(PREVIOUS_COMMAND, PREVIOUS_COMMAND_SHORT).to(Command::Previous);
        let finish = op(FINISH_COMMAND).to(Command::Finish);
        let start = op(START_COMMAND).to(Command::Start);
        let restart = op(RESTART_COMMAND).to(Command::Restart);
        let quit = op2(QUIT_COMMAND, QUIT_COMMAND_SHORT).to(Command::Quit);
        let kill = op(KILL_COMMAND).to(Command::Kill);
        let exit = op(EXIT_COMMAND).to(Command::Exit);
        let backtrace = op2(BACKTRACE_COMMAND, BACKTRACE_COMMAND_SHORT).to(Command::Backtrace);

        let r#break = op2(BREAK_COMMAND, BREAK_COMMAND_SHORT)
            .ignore_then(choice((
                op2(BREAK_REMOVE_SUBCOMMAND, BREAK_REMOVE_SUBCOMMAND_SHORT).ignore_then(choice((
                    op(BREAK_ALL_KEY).to(BreakpointCommand::RemoveAll),
                    number().map(BreakpointCommand::Remove),
                ))),
                op(BREAK_INFO_SUBCOMMAND).to(BreakpointCommand::Info),
                brkpt_at_line(),
            )))
            .map(Command::Breakpoint)
            .boxed();

        let frame = op2(FRAME_COMMAND, FRAME_COMMAND_SHORT)
            .ignore_then(number())
            .map(Command::Frame)
            .boxed();

        let print = op_arg(PRINT_COMMAND, PRINT_COMMAND_SHORT)
            .ignore_then(rest())
            .map(Command::Print)
            .boxed();

        let watch = op2(WATCH_COMMAND, WATCH_COMMAND_SHORT)
            .ignore_then(choice((
                op2(WATCH_REMOVE_SUBCOMMAND, WATCH_REMOVE_SUBCOMMAND_SHORT)
                    .ignore_then(number())
                    .map(WatchCommand::Remove)
                    .then_ignore(end()),
                op(WATCH_CLEAR_SUBCOMMAND)
                    .to(WatchCommand::Clear)
                    .then_ignore(end()),
                op(WATCH_INFO_SUBCOMMAND)
                    .to(WatchCommand::Info)
                    .then_ignore(end()),
                op(WATCH_REFRESH_SUBCOMMAND)
                    .to(WatchCommand::Refresh)
                    .then_ignore(end()),
                end().to(WatchCommand::Info),
                rest().map(WatchCommand::Add),
            )))
            .map(Command::Watch)
            .boxed();

        let help = op2(HELP_COMMAND, HELP_COMMAND_SHORT)
            .ignore_then(text::ident().or_not())
            .map(|s: Option<&str>| Command::Help(s.map(ToOwned::to_owned)))
            .padded()
            .boxed();

        choice((
            command(LAUNCH_COMMAND, launch),
            command(RUN_COMMAND, run),
            command(REVERSE_COMMAND, reverse),
            command(RESTART_COMMAND, restart),
            command(STEP_COMMAND, step),
            command(START_COMMAND, start),
            command(BACKSTEP_COMMAND, backstep),
            command(BACKTRACE_COMMAND, backtrace),
            command(BREAK_COMMAND, r#break),
            command(NEXT_COMMAND, next),
            command(PREVIOUS_COMMAND, previous),
            command(PRINT_COMMAND, print),
            command(FINISH_COMMAND, finish),
            command(FRAME_COMMAND, frame),
            command(WATCH_COMMAND, watch),
            command(QUIT_COMMAND, quit),
            command(KILL_COMMAND, kill),
            command(EXIT_COMMAND, exit),
            command(HELP_COMMAND, help),
        ))
        .map_err(|e| {
            let span = e.span();
            if span.start == 0 && span.end == 0 {
                Rich::custom(*e.span(), "type help for list of commands")
            } else {
                e
            }
        })
    }
}
