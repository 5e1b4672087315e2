//! TLatex markup (`p_{T}`, `#eta`, `#bf{...}`) turned into styled Unicode runs.

use crate::primitives::{FontStyle, FontWeight};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shift {
    #[default]
    Normal,
    Sub,
    Super,
}

/// A stretch of text sharing one vertical shift and font override.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub shift: Shift,
    pub weight: Option<FontWeight>,
    pub style: Option<FontStyle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Attrs {
    shift: Shift,
    weight: Option<FontWeight>,
    style: Option<FontStyle>,
}

/// Parse TLatex markup into runs. Plain text yields a single run.
pub fn parse(input: &str) -> Vec<TextRun> {
    let mut p = Parser { chars: input.chars().collect(), pos: 0, runs: Vec::new() };
    p.sequence(Attrs::default(), false);
    p.runs
}

/// The text of `input` with all markup resolved and run styling dropped.
pub fn to_plain(input: &str) -> String {
    parse(input).into_iter().map(|r| r.text).collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    runs: Vec<TextRun>,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn push(&mut self, text: &str, attrs: Attrs) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.shift == attrs.shift
            && last.weight == attrs.weight
            && last.style == attrs.style
        {
            last.text.push_str(text);
            return;
        }
        self.runs.push(TextRun {
            text: text.to_string(),
            shift: attrs.shift,
            weight: attrs.weight,
            style: attrs.style,
        });
    }

    /// Tokens until end of input, or until the closing brace if `in_group`.
    fn sequence(&mut self, attrs: Attrs, in_group: bool) {
        while let Some(c) = self.peek() {
            if c == '}' && in_group {
                self.pos += 1;
                return;
            }
            self.token(attrs);
        }
    }

    fn token(&mut self, attrs: Attrs) {
        let Some(c) = self.peek() else { return };
        self.pos += 1;
        match c {
            '{' => self.sequence(attrs, true),
            '_' => self.argument(Attrs { shift: Shift::Sub, ..attrs }),
            '^' => self.argument(Attrs { shift: Shift::Super, ..attrs }),
            '#' => self.command(attrs),
            other => {
                let mut buf = [0u8; 4];
                self.push(other.encode_utf8(&mut buf), attrs);
            }
        }
    }

    /// A braced group or a single token.
    fn argument(&mut self, attrs: Attrs) {
        if self.peek() == Some('{') {
            self.pos += 1;
            self.sequence(attrs, true);
        } else {
            self.token(attrs);
        }
    }

    fn skip_bracket_option(&mut self) {
        if self.peek() != Some('[') {
            return;
        }
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == ']' {
                break;
            }
        }
    }

    fn command(&mut self, attrs: Attrs) {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "" => {
                // `##` or a lone `#`
                if self.peek() == Some('#') {
                    self.pos += 1;
                }
                self.push("#", attrs);
            }
            "bf" => self.argument(Attrs { weight: Some(FontWeight::Bold), ..attrs }),
            "it" => self.argument(Attrs { style: Some(FontStyle::Italic), ..attrs }),
            "font" | "color" | "scale" | "size" | "kern" | "lower" => {
                self.skip_bracket_option();
                self.argument(attrs);
            }
            "frac" => {
                self.argument(attrs);
                self.push("/", attrs);
                self.argument(attrs);
            }
            "splitline" => {
                self.argument(attrs);
                self.push(" ", attrs);
                self.argument(attrs);
            }
            "sqrt" => {
                self.skip_bracket_option();
                self.push("\u{221A}", attrs);
                self.argument(attrs);
            }
            "bar" | "hat" | "tilde" | "dot" | "vec" => {
                let mark = match name.as_str() {
                    "bar" => '\u{0305}',
                    "hat" => '\u{0302}',
                    "tilde" => '\u{0303}',
                    "dot" => '\u{0307}',
                    _ => '\u{20D7}',
                };
                let first = self.runs.len();
                let merge_point = self.runs.last().map(|r| r.text.len());
                self.argument(attrs);
                accent_runs(&mut self.runs, first, merge_point, mark);
            }
            other => match symbol(other) {
                Some(s) => self.push(s, attrs),
                None => {
                    self.push("#", attrs);
                    self.push(other, attrs);
                }
            },
        }
    }
}

/// Put `mark` after every character appended since `first`/`merge_point`.
fn accent_runs(runs: &mut [TextRun], first: usize, merge_point: Option<usize>, mark: char) {
    let accent = |s: &str| s.chars().flat_map(|c| [c, mark]).collect::<String>();
    if let (Some(cut), Some(prev)) = (merge_point, first.checked_sub(1))
        && let Some(run) = runs.get_mut(prev)
        && run.text.len() > cut
    {
        let tail = accent(&run.text[cut..]);
        run.text.truncate(cut);
        run.text.push_str(&tail);
    }
    for run in runs.iter_mut().skip(first) {
        run.text = accent(&run.text);
    }
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "\u{03B1}",
        "beta" => "\u{03B2}",
        "gamma" => "\u{03B3}",
        "delta" => "\u{03B4}",
        "epsilon" | "varepsilon" => "\u{03B5}",
        "zeta" => "\u{03B6}",
        "eta" => "\u{03B7}",
        "theta" => "\u{03B8}",
        "vartheta" => "\u{03D1}",
        "iota" => "\u{03B9}",
        "kappa" => "\u{03BA}",
        "lambda" => "\u{03BB}",
        "mu" => "\u{03BC}",
        "nu" => "\u{03BD}",
        "xi" => "\u{03BE}",
        "omicron" => "\u{03BF}",
        "pi" => "\u{03C0}",
        "rho" => "\u{03C1}",
        "sigma" => "\u{03C3}",
        "varsigma" => "\u{03C2}",
        "tau" => "\u{03C4}",
        "upsilon" => "\u{03C5}",
        "phi" => "\u{03C6}",
        "varphi" => "\u{03D5}",
        "chi" => "\u{03C7}",
        "psi" => "\u{03C8}",
        "omega" => "\u{03C9}",
        "varomega" => "\u{03D6}",
        "Alpha" => "\u{0391}",
        "Beta" => "\u{0392}",
        "Gamma" => "\u{0393}",
        "Delta" => "\u{0394}",
        "Epsilon" => "\u{0395}",
        "Zeta" => "\u{0396}",
        "Eta" => "\u{0397}",
        "Theta" => "\u{0398}",
        "Iota" => "\u{0399}",
        "Kappa" => "\u{039A}",
        "Lambda" => "\u{039B}",
        "Mu" => "\u{039C}",
        "Nu" => "\u{039D}",
        "Xi" => "\u{039E}",
        "Omicron" => "\u{039F}",
        "Pi" => "\u{03A0}",
        "Rho" => "\u{03A1}",
        "Sigma" => "\u{03A3}",
        "Tau" => "\u{03A4}",
        "Upsilon" => "\u{03A5}",
        "Phi" => "\u{03A6}",
        "Chi" => "\u{03A7}",
        "Psi" => "\u{03A8}",
        "Omega" => "\u{03A9}",
        "pm" => "\u{00B1}",
        "mp" => "\u{2213}",
        "times" => "\u{00D7}",
        "cdot" => "\u{00B7}",
        "div" => "\u{00F7}",
        "leq" => "\u{2264}",
        "geq" => "\u{2265}",
        "neq" => "\u{2260}",
        "approx" => "\u{2248}",
        "sim" => "\u{223C}",
        "equiv" => "\u{2261}",
        "propto" => "\u{221D}",
        "infty" => "\u{221E}",
        "partial" => "\u{2202}",
        "nabla" => "\u{2207}",
        "circ" => "\u{00B0}",
        "ll" => "\u{226A}",
        "gg" => "\u{226B}",
        "in" => "\u{2208}",
        "rightarrow" => "\u{2192}",
        "leftarrow" => "\u{2190}",
        "leftrightarrow" => "\u{2194}",
        "Rightarrow" => "\u{21D2}",
        "downarrow" => "\u{2193}",
        "uparrow" => "\u{2191}",
        "ell" => "\u{2113}",
        "hbar" => "\u{210F}",
        "sum" => "\u{2211}",
        "int" => "\u{222B}",
        "prime" => "\u{2032}",
        "void" | "void1" => "\u{2205}",
        "perp" => "\u{22A5}",
        "odot" => "\u{2299}",
        "otimes" => "\u{2297}",
        "oplus" => "\u{2295}",
        "wedge" => "\u{2227}",
        "vee" => "\u{2228}",
        "cup" => "\u{222A}",
        "cap" => "\u{2229}",
        "forall" => "\u{2200}",
        "exists" => "\u{2203}",
        "bullet" => "\u{2022}",
        "dagger" => "\u{2020}",
        "AA" => "\u{00C5}",
        "aa" => "\u{00E5}",
        "upoint" => "\u{00B7}",
        "minus" => "\u{2212}",
        _ => return None,
    })
}
