use crate::ui::command::parser::{
    BACKSTEP_COMMAND, BACKSTEP_COMMAND_SHORT, BACKTRACE_COMMAND, BACKTRACE_COMMAND_SHORT,
    BREAK_COMMAND, BREAK_COMMAND_SHORT, BREAK_INFO_SUBCOMMAND, BREAK_REMOVE_SUBCOMMAND,
    EXIT_COMMAND, FINISH_COMMAND, FRAME_COMMAND, FRAME_COMMAND_SHORT, HELP_COMMAND,
    HELP_COMMAND_SHORT, KILL_COMMAND, LAUNCH_COMMAND, NEXT_COMMAND, NEXT_COMMAND_SHORT,
    PREVIOUS_COMMAND, PREVIOUS_COMMAND_SHORT, PRINT_COMMAND, PRINT_COMMAND_SHORT, QUIT_COMMAND,
    QUIT_COMMAND_SHORT, RESTART_COMMAND, REVERSE_COMMAND, REVERSE_COMMAND_SHORT, RUN_COMMAND,
    RUN_COMMAND_SHORT, START_COMMAND, STEP_COMMAND, STEP_COMMAND_SHORT, WATCH_CLEAR_SUBCOMMAND,
    WATCH_COMMAND, WATCH_COMMAND_SHORT, WATCH_INFO_SUBCOMMAND, WATCH_REFRESH_SUBCOMMAND,
    WATCH_REMOVE_SUBCOMMAND,
};
use chumsky::prelude::{any, choice, just};
use chumsky::text::whitespace;
use chumsky::{extra, text, Parser};
use crossterm::style::{Color, Stylize};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::MemHistory;
use rustyline::line_buffer::LineBuffer;
use rustyline::{Changeset, CompletionType, Config, Context, Editor};
use rustyline_derive::{Helper, Hinter, Validator};
use std::borrow::Cow;
use std::borrow::Cow::{Borrowed, Owned};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use trie_rs::{Trie, TrieBuilder};

struct CommandHint {
    short: Option<String>,
    long: String,
    subcommands: Vec<String>,
}

impl CommandHint {
    fn long(&self) -> String {
        self.long.clone()
    }

    fn display_with_short(&self) -> String {
        if let Some(ref short) = self.short {
            if self.long.starts_with(short) {
                format!(
                    "{}{}",
                    short.clone().bold().underlined(),
                    &self.long[short.len()..]
                )
            } else {
                format!("{}|{}", &self.long, short.clone().bold().underlined())
            }
        } else {
            self.long()
        }
    }

    fn with_subcommands(mut self, subcommands: &[&str]) -> Self {
        self.subcommands = subcommands.iter().map(ToString::to_string).collect();
        self
    }
}

impl From<&str> for CommandHint {
    fn from(value: &str) -> Self {
        CommandHint {
            short: None,
            long: value.to_string(),
            subcommands: vec![],
        }
    }
}

impl From<(&str, &str)> for CommandHint {
    fn from((short, long): (&str, &str)) -> Self {
        CommandHint {
            short: Some(short.to_string()),
            long: long.to_string(),
            subcommands: vec![],
        }
    }
}

pub struct CommandCompleter {
    commands: Vec<CommandHint>,
    subcommand_hints: HashMap<String, Vec<String>>,
    /// Module names known from search paths.
    module_hints: Trie<u8>,
    modules: Vec<String>,
    /// Watch expressions, offered for `print`.
    expression_hints: Trie<u8>,
    expressions: Vec<String>,
}

impl CommandCompleter {
    fn new(commands: impl IntoIterator<Item = CommandHint>) -> Self {
        let commands: Vec<CommandHint> = commands.into_iter().collect();
        let subcommand_hints = commands
            .iter()
            .flat_map(|cmd| {
                let mut hints = vec![(cmd.long.clone(), cmd.subcommands.clone())];
                if let Some(ref short) = cmd.short {
                    hints.push((short.clone(), cmd.subcommands.clone()));
                }
                hints
            })
            .collect::<HashMap<String, Vec<String>>>();

        Self {
            commands,
            subcommand_hints,
            module_hints: TrieBuilder::new().build(),
            modules: vec![],
            expression_hints: TrieBuilder::new().build(),
            expressions: vec![],
        }
    }

    pub fn replace_module_hints(&mut self, modules: impl IntoIterator<Item = String>) {
        let mut builder = TrieBuilder::new();
        self.modules = modules.into_iter().collect();
        self.modules.sort();
        self.modules.dedup();
        self.modules.iter().for_each(|module| {
            builder.push(module);
        });
        self.module_hints = builder.build();
    }

    pub fn replace_expression_hints(&mut self, expressions: impl IntoIterator<Item = String>) {
        let mut builder = TrieBuilder::new();
        self.expressions = expressions.into_iter().collect();
        self.expressions.iter().for_each(|expr| {
            builder.push(expr);
        });
        self.expression_hints = builder.build();
    }
}

#[derive(Debug)]
enum CompletableCommand<'a> {
    Breakpoint(&'a str),
    Print(&'a str),
    Unrecognized(&'a str, Option<&'a str>),
}

impl<'a> CompletableCommand<'a> {
    fn recognize(line: &'a str) -> Option<CompletableCommand<'a>> {
        let op = just::<_, _, extra::Default>;

        let bp = op(BREAK_COMMAND)
            .or(op(BREAK_COMMAND_SHORT))
            .then(whitespace().at_least(1))
            .ignore_then(
                any()
                    .filter(|c: &char| !c.is_whitespace())
                    .repeated()
                    .to_slice(),
            )
            .then_ignore(chumsky::prelude::end())
            .map(CompletableCommand::Breakpoint);

        let print = op(PRINT_COMMAND)
            .or(op(PRINT_COMMAND_SHORT))
            .then(whitespace().at_least(1))
            .ignore_then(any().repeated().to_slice())
            .map(CompletableCommand::Print);

        let other = text::ident()
            .then_ignore(whitespace().at_least(1))
            .then(text::ident().or_not())
            .map(|(s1, s2): (&str, Option<&str>)| CompletableCommand::Unrecognized(s1.trim(), s2))
            .padded();

        let r = choice((bp, print, other)).parse(line);
        r.into_result().ok()
    }
}

fn pairs_from_variants(
    variants: impl Iterator<Item = impl ToString>,
    line: &str,
    tpl: &str,
    replacement_suffix: &str,
) -> (usize, Vec<Pair>) {
    let pos = line.len() - tpl.len();
    let pairs = variants.map(|v| Pair {
        display: v.to_string(),
        replacement: v.to_string() + replacement_suffix,
    });
    (pos, pairs.collect())
}

/// Variants starting with `prefix`, all variants if the prefix is empty.
fn search(hints: &Trie<u8>, all: &[String], prefix: &str) -> Vec<String> {
    if prefix.trim().is_empty() {
        return all.to_vec();
    }
    hints
        .predictive_search(prefix)
        .into_iter()
        .filter_map(|variant| String::from_utf8(variant).ok())
        .collect()
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        match CompletableCommand::recognize(line) {
            Some(CompletableCommand::Breakpoint(maybe_module)) => {
                let modules = search(&self.module_hints, &self.modules, maybe_module);
                let (pos, mut pairs) =
                    pairs_from_variants(modules.into_iter(), line, maybe_module, " ");
                if let Some(subcommands) = self.subcommand_hints.get(BREAK_COMMAND) {
                    let subcommands = subcommands
                        .iter()
                        .filter(|&subcmd| subcmd.starts_with(maybe_module));
                    let (_, subcommand_pairs) =
                        pairs_from_variants(subcommands, line, maybe_module, " ");
                    pairs.extend(subcommand_pairs);
                }
                return Ok((pos, pairs));
            }
            Some(CompletableCommand::Print(maybe_expr)) => {
                let expressions = search(&self.expression_hints, &self.expressions, maybe_expr);
                return Ok(pairs_from_variants(
                    expressions.into_iter(),
                    line,
                    maybe_expr,
                    "",
                ));
            }
            Some(CompletableCommand::Unrecognized(cmd, mb_subcmd_part)) => {
                if let Some(subcommands) = self.subcommand_hints.get(cmd) {
                    let pos = cmd.len() + 1;
                    let subcmd_part = mb_subcmd_part.unwrap_or_default();
                    let subcommands = subcommands
                        .iter()
                        .filter(|&subcmd| subcmd.starts_with(subcmd_part))
                        .map(|subcmd| Pair {
                            display: subcmd.to_string(),
                            replacement: subcmd.to_string(),
                        })
                        .collect();

                    return Ok((pos, subcommands));
                }
            }
            None => {}
        }

        let pairs = self
            .commands
            .iter()
            .filter(|&cmd| cmd.long.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.display_with_short(),
                replacement: cmd.long(),
            })
            .collect();
        Ok((0, pairs))
    }
}

#[derive(Helper, Hinter, Validator)]
pub struct RLHelper {
    pub completer: Arc<Mutex<CommandCompleter>>,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    pub colored_prompt: String,
}

impl RLHelper {
    fn completer(&self) -> MutexGuard<'_, CommandCompleter> {
        self.completer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Completer for RLHelper {
    type Candidate = <CommandCompleter as Completer>::Candidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        self.completer().complete(line, pos, ctx)
    }

    fn update(&self, line: &mut LineBuffer, start: usize, elected: &str, cl: &mut Changeset) {
        self.completer().update(line, start, elected, cl)
    }
}

impl Highlighter for RLHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(format!("{}", hint.with(Color::Grey)))
    }
}

pub fn create_editor(promt: &str) -> anyhow::Result<Editor<RLHelper, MemHistory>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let commands = [
        LAUNCH_COMMAND.into(),
        (RUN_COMMAND_SHORT, RUN_COMMAND).into(),
        (REVERSE_COMMAND_SHORT, REVERSE_COMMAND).into(),
        (STEP_COMMAND_SHORT, STEP_COMMAND).into(),
        (BACKSTEP_COMMAND_SHORT, BACKSTEP_COMMAND).into(),
        (NEXT_COMMAND_SHORT, NEXT_COMMAND).into(),
        (PREVIOUS_COMMAND_SHORT, PREVIOUS_COMMAND).into(),
        FINISH_COMMAND.into(),
        START_COMMAND.into(),
        RESTART_COMMAND.into(),
        CommandHint::from((BREAK_COMMAND_SHORT, BREAK_COMMAND))
            .with_subcommands(&[BREAK_REMOVE_SUBCOMMAND, BREAK_INFO_SUBCOMMAND]),
        (FRAME_COMMAND_SHORT, FRAME_COMMAND).into(),
        (BACKTRACE_COMMAND_SHORT, BACKTRACE_COMMAND).into(),
        (PRINT_COMMAND_SHORT, PRINT_COMMAND).into(),
        CommandHint::from((WATCH_COMMAND_SHORT, WATCH_COMMAND)).with_subcommands(&[
            WATCH_REMOVE_SUBCOMMAND,
            WATCH_CLEAR_SUBCOMMAND,
            WATCH_INFO_SUBCOMMAND,
            WATCH_REFRESH_SUBCOMMAND,
        ]),
        (QUIT_COMMAND_SHORT, QUIT_COMMAND).into(),
        KILL_COMMAND.into(),
        EXIT_COMMAND.into(),
        (HELP_COMMAND_SHORT, HELP_COMMAND).into(),
    ];

    let h = RLHelper {
        completer: Arc::new(Mutex::new(CommandCompleter::new(commands))),
        hinter: HistoryHinter {},
        colored_prompt: format!("{}", promt.with(Color::DarkGreen)),
    };

    let mut editor = Editor::with_history(config, MemHistory::new())?;
    editor.set_helper(Some(h));
    Ok(editor)
}
