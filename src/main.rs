// SPDX-License-Identifier: MIT
//
// hashtint: preview deterministic identifier coloring in the terminal.
//
// Wires the crates together the way an editor integration would:
//
//   tint-engine → validated config, color tables, render patterns
//   tint-host   → token decoding, debounced session, display surface
//   tint-color  → the colors printed back out
//
// A run loads a settings file and a semantic token dump, schedules one
// pass, steps the clock past the debounce delay, and prints the document
// with every assignment painted in 24-bit color, followed by a legend of
// the handles used.
//
//   hashtint <settings.json> <tokens.json> [pattern]
//   hashtint --patterns

use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::process;
use std::time::Instant;

use ropey::Rope;
use serde::Deserialize;
use tint_color::Rgb;
use tint_engine::{HandleStyle, LogSink, RawConfig, RenderAssignment, RenderPattern};
use tint_host::{
    DocumentId, DocumentTokens, Legend, PassOutcome, RecordingSurface, Session, SpanSource,
};

const USAGE: &str = "usage: hashtint <settings.json> <tokens.json> [pattern]\n       hashtint --patterns";

// ─── Token dump ─────────────────────────────────────────────────────────────

/// A document and its semantic tokens, as captured from a language server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenDump {
    path: String,
    legend: Legend,
    data: Vec<u32>,
    text: String,
}

/// Serves the one dumped document.
struct DumpSource {
    document: DocumentId,
    tokens: DocumentTokens,
}

impl DumpSource {
    fn new(dump: TokenDump) -> Self {
        Self {
            document: DocumentId::new(dump.path),
            tokens: DocumentTokens {
                legend: dump.legend,
                data: dump.data,
                text: Rope::from_str(&dump.text),
            },
        }
    }
}

impl SpanSource for DumpSource {
    fn fetch(&mut self, document: &DocumentId) -> Option<DocumentTokens> {
        (*document == self.document).then(|| self.tokens.clone())
    }
}

// ─── Painting ───────────────────────────────────────────────────────────────

/// What to draw at one character cell.
#[derive(Default, Clone)]
struct Paint {
    color: Option<Rgb>,
    badge: Option<(String, Option<Rgb>)>,
}

fn fg(c: Rgb) -> String {
    format!("\x1b[38;2;{};{};{}m", c.r, c.g, c.b)
}

const RESET: &str = "\x1b[0m";

/// Resolve every assigned range to per-cell paint.
fn paint_map(
    session: &Session,
    applied: &[RenderAssignment],
) -> Result<HashMap<(usize, usize), Paint>, Box<dyn Error>> {
    let mut cells: HashMap<(usize, usize), Paint> = HashMap::new();
    for assignment in applied {
        let style = session.engine().style(assignment.handle)?;
        for range in &assignment.ranges {
            match style {
                HandleStyle::Color(c) => {
                    for col in range.start..range.end {
                        cells.entry((range.line, col)).or_default().color = Some(*c);
                    }
                }
                HandleStyle::Glyph { glyph, color, .. } => {
                    cells.entry((range.line, range.start)).or_default().badge =
                        Some((glyph.clone(), *color));
                }
            }
        }
    }
    Ok(cells)
}

fn paint_document(text: &Rope, cells: &HashMap<(usize, usize), Paint>) -> String {
    let mut out = String::new();
    for (line_idx, line) in text.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let Some(paint) = cells.get(&(line_idx, col)) else {
                out.push(ch);
                continue;
            };
            if let Some((glyph, color)) = &paint.badge {
                match color {
                    Some(c) => {
                        let _ = write!(out, "{}{glyph}{RESET}", fg(*c));
                    }
                    None => out.push_str(glyph),
                }
            }
            match paint.color {
                Some(c) => {
                    let _ = write!(out, "{}{ch}{RESET}", fg(c));
                }
                None => out.push(ch),
            }
        }
    }
    out
}

fn print_legend(session: &Session, applied: &[RenderAssignment]) -> Result<(), Box<dyn Error>> {
    for assignment in applied {
        let ranges: Vec<String> = assignment.ranges.iter().map(|r| format!("{r:?}")).collect();
        match session.engine().style(assignment.handle)? {
            HandleStyle::Color(c) => {
                println!("{:?}  {}██{RESET} {c}  {}", assignment.handle, fg(*c), ranges.join(" "));
            }
            HandleStyle::Glyph { glyph, .. } => {
                println!("{:?}  {glyph}  {}", assignment.handle, ranges.join(" "));
            }
        }
    }
    Ok(())
}

// ─── Entry ──────────────────────────────────────────────────────────────────

fn list_patterns() {
    let mut group = "";
    for pattern in RenderPattern::ALL {
        if pattern.group() != group {
            group = pattern.group();
            println!("{group}");
        }
        println!("  {}  {:<32} {}", pattern.code(), pattern.slug(), pattern.label());
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (settings_path, tokens_path, pattern) = match args {
        [flag] if flag == "--patterns" => {
            list_patterns();
            return Ok(());
        }
        [settings, tokens] => (settings, tokens, None),
        [settings, tokens, name] => (settings, tokens, Some(name.parse::<RenderPattern>()?)),
        _ => return Err(USAGE.into()),
    };

    let raw: RawConfig = serde_json::from_str(&fs::read_to_string(settings_path)?)?;
    let dump: TokenDump = serde_json::from_str(&fs::read_to_string(tokens_path)?)?;
    let mut source = DumpSource::new(dump);
    let document = source.document.clone();

    let mut session = Session::new(&raw, &mut LogSink)?;
    let delay = session.config()?.render_delay;
    let mut surface = RecordingSurface::default();

    let now = Instant::now();
    match pattern {
        Some(p) => session.set_pattern(p, document, now),
        None => session.on_trigger(document, now),
    }

    match session.tick(now + delay, &mut source, &mut surface) {
        Some(PassOutcome::Rendered { pattern, spans, handles }) => {
            log::info!("{}: {spans} span(s), {handles} handle(s)", pattern.slug());
        }
        Some(PassOutcome::Failed(e)) => return Err(e.into()),
        Some(PassOutcome::Skipped(skip)) => {
            println!("nothing rendered: {skip:?}");
            return Ok(());
        }
        None => return Err("render pass did not fire".into()),
    }

    let cells = paint_map(&session, &surface.applied)?;
    print!("{}", paint_document(&source.tokens.text, &cells));
    println!();
    print_legend(&session, &surface.applied)
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("hashtint: {e}");
        process::exit(1);
    }
}
