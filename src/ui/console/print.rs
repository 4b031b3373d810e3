use crate::cs_warn;
use rustyline::history::History;
use rustyline::{Editor, ExternalPrinter as RLExternalPrinter, Helper};
use std::cell::RefCell;
use std::fmt::Display;

/// [`ExternalPrinter`] safe print messages to stdout while a user types a command.
pub struct ExternalPrinter {
    printer: Option<RefCell<Box<dyn RLExternalPrinter>>>,
}

unsafe impl Send for ExternalPrinter {}

impl ExternalPrinter {
    pub fn new<H: Helper, I: History>(editor: &mut Editor<H, I>) -> rustyline::Result<Self> {
        let external_p = editor.create_external_printer()?;
        Ok(Self {
            printer: Some(RefCell::new(Box::new(external_p))),
        })
    }

    /// Printer that writes directly to stdout.
    pub fn stdout() -> Self {
        Self { printer: None }
    }

    pub fn print(&self, msg: impl Display) {
        let msg = msg.to_string();
        match &self.printer {
            None => {
                println!("{msg}")
            }
            Some(printer) => {
                if let Err(e) = printer.borrow_mut().print(msg) {
                    cs_warn!("external printer error: {e}");
                }
            }
        }
    }
}

pub mod style {
    use crossterm::style::{Color, Stylize};
    use std::fmt::{Display, Formatter};

    const UNKNOWN_PLACEHOLDER: &str = "???";

    struct View<T: Display> {
        inner: Option<T>,
        color: Color,
    }

    impl<T: Display> Display for View<T> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            let text = self
                .inner
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());
            f.write_fmt(format_args!("{}", text.with(self.color)))
        }
    }

    /// Construct structure declaration to display data of the same type (file paths,
    /// function names, etc.).
    macro_rules! view_struct {
        ($name: ident, $color: expr) => {
            pub struct $name<T: Display>(View<T>);

            impl<T: Display> From<T> for $name<T> {
                fn from(value: T) -> Self {
                    Self(View {
                        inner: Some(value),
                        color: $color,
                    })
                }
            }

            impl<T: Display> From<Option<T>> for $name<T> {
                fn from(value: Option<T>) -> Self {
                    Self(View {
                        inner: value,
                        color: $color,
                    })
                }
            }

            impl<T: Display> Display for $name<T> {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    self.0.fmt(f)
                }
            }
        };
    }

    view_struct!(FilePathView, Color::Green);
    view_struct!(FunctionNameView, Color::Yellow);
    view_struct!(KeywordView, Color::Magenta);
    view_struct!(WarningView, Color::DarkYellow);
    view_struct!(ErrorView, Color::Red);
}
