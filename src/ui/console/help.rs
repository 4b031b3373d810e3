use crate::ui::command::parser;

pub const HELP: &str = r#"
Available debugger commands:

launch                                      -- start a new debugger session
r, run                                      -- run the program until a breakpoint or the end
rc, reverse                                 -- run the program backwards until a breakpoint or the beginning
s, step                                     -- step to the next event
bs, backstep                                -- step back to the previous event
n, next                                     -- step over function calls
prev, previous                              -- step back over function calls
finish                                      -- run until the current function returns
start                                       -- run backwards to the call of the current function
restart                                     -- go back to the beginning of the program
b, break <module> <line> [<column>]|remove|info -- manage breakpoints
f, frame <number>                           -- select a stack frame
bt, backtrace                               -- print the call stack
p, print <expression>                       -- evaluate an expression
w, watch <expression>|remove|clear|info|refresh -- manage watch expressions
q, quit                                     -- ask the debugger to quit, a second request kills it
kill                                        -- kill the debugger and the program
exit                                        -- leave the console
h, help <>|<command>                        -- show help
"#;

pub const HELP_BREAK: &str = "\
\x1b[32;1mbreak\x1b[0m
Manage breakpoints.

Available subcomands:
break <module> <line> [<column>] - set a breakpoint, column is 1 by default
break remove <number>|all - remove a breakpoint by its number or all of them
break info - print all breakpoints

Module may be given as `Foo`, `foo` or `foo.ml`.

Examples of usage:
break main 12
b r 1
";

pub const HELP_WATCH: &str = "\
\x1b[32;1mwatch\x1b[0m
Manage expressions evaluated every time the program stops.

Available subcomands:
watch <expression> - add an expression
watch remove <index> - remove an expression by its index in the list
watch clear - remove all expressions
watch info - print expressions and their last values
watch refresh - evaluate all expressions again
";

pub const HELP_PRINT: &str = "\
\x1b[32;1mprint\x1b[0m
Evaluate an expression in the current frame.

Supported expressions: names (`x`, `Module.x`), history values (`$1`), record fields
(`r.field`), array and string indexing (`a.(0)`, `s.[0]`) and dereference (`!r`).
";

pub const HELP_QUIT: &str = "\
\x1b[32;1mquit\x1b[0m
Ask the debugger to quit. While the debugger is quitting (or waiting for a remote program),
the request kills it.
";

pub fn help_for_command(command: Option<&str>) -> &str {
    match command {
        None => HELP,
        Some(parser::BREAK_COMMAND) | Some(parser::BREAK_COMMAND_SHORT) => HELP_BREAK,
        Some(parser::WATCH_COMMAND) | Some(parser::WATCH_COMMAND_SHORT) => HELP_WATCH,
        Some(parser::PRINT_COMMAND) | Some(parser::PRINT_COMMAND_SHORT) => HELP_PRINT,
        Some(parser::QUIT_COMMAND) | Some(parser::QUIT_COMMAND_SHORT) => HELP_QUIT,
        _ => "unknown command",
    }
}
