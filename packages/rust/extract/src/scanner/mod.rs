//! Depth-tracked, stack-based scan over the HTML tag stream.
//!
//! A single left-to-right pass recognizes job-card containers and pulls
//! out title/team/location fields via the class-name and link-pattern
//! heuristics, without ever building a tree. The archived pages span
//! several redesigns, so everything here errs toward capturing too much
//! rather than missing a posting; the dedup pass downstream cleans up.

pub mod tokens;

use tracing::debug;

use waybackjobs_shared::JobRecord;
use waybackjobs_shared::heuristics::{
    is_job_card, is_job_link, is_location_element, is_team_element,
};

use tokens::{Event, Tokenizer, is_void_element, normalize_ws};

/// Open-element ceiling. Archived pages occasionally contain pathological
/// nesting; past this the scan stops and keeps whatever it has.
const MAX_DEPTH: usize = 512;

/// Everything one scan produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Records assembled from recognized job cards, in document order.
    pub jobs: Vec<JobRecord>,
    /// Every job-like link seen anywhere in the document, card or not.
    /// This side list feeds the link-based fallback tier.
    pub links: Vec<SideLink>,
    /// Why the scan stopped early, if it did. Partial results are kept.
    pub aborted: Option<String>,
}

/// One entry in the side list of job-like links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideLink {
    pub href: String,
    pub text: String,
}

/// Which field an open capture feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureTarget {
    Title,
    Team,
    Location,
    /// Anchor text for the most recent side-list entry.
    LinkText,
}

/// An in-flight text capture: opened by a start tag, closed when the
/// depth falls back below the depth it was opened at (matching by stack
/// position rather than tag name, to tolerate nested markup).
#[derive(Debug)]
struct Capture {
    target: CaptureTarget,
    depth: usize,
    buffer: String,
}

/// The scan state machine: depth counter, tag stack, card flag, one
/// capture slot, and the two accumulating outputs.
struct ListingScanner {
    depth: usize,
    stack: Vec<String>,
    in_card: bool,
    card_depth: usize,
    current: JobRecord,
    capture: Option<Capture>,
    jobs: Vec<JobRecord>,
    links: Vec<SideLink>,
}

impl ListingScanner {
    fn new() -> Self {
        Self {
            depth: 0,
            stack: Vec::new(),
            in_card: false,
            card_depth: 0,
            current: JobRecord::default(),
            capture: None,
            jobs: Vec::new(),
            links: Vec::new(),
        }
    }

    fn open_capture(&mut self, target: CaptureTarget) {
        self.capture = Some(Capture {
            target,
            depth: self.depth,
            buffer: String::new(),
        });
    }

    fn on_start(&mut self, name: &str, class: &str, href: &str, self_closing: bool) {
        // The side list collects every job-like link regardless of card
        // state; it is the raw material for the fallback tiers.
        let job_link = name == "a" && !href.is_empty() && is_job_link(href);
        if job_link {
            self.links.push(SideLink {
                href: href.to_string(),
                text: String::new(),
            });
        }

        // Void and self-closed elements carry no content: they neither
        // grow the stack nor open captures.
        if self_closing || is_void_element(name) {
            return;
        }

        self.depth += 1;
        self.stack.push(name.to_string());

        if is_job_card(name, class) {
            self.in_card = true;
            self.card_depth = self.depth;
            self.current = JobRecord::default();
        }

        if self.in_card {
            if job_link {
                self.current.url = Some(href.to_string());
                self.open_capture(CaptureTarget::Title);
            } else if is_team_element(class) {
                self.open_capture(CaptureTarget::Team);
            } else if is_location_element(class) {
                self.open_capture(CaptureTarget::Location);
            }
        } else if job_link {
            self.open_capture(CaptureTarget::LinkText);
        }
    }

    fn on_text(&mut self, text: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.buffer.push_str(text);
        }
    }

    fn on_end(&mut self, name: &str) {
        if is_void_element(name) {
            return;
        }

        // Permissive unwinding: pop whatever is on top, even when the
        // closing name does not match, and never go below zero.
        self.stack.pop();
        self.depth = self.depth.saturating_sub(1);

        let closing = self
            .capture
            .as_ref()
            .is_some_and(|capture| self.depth < capture.depth);
        if closing {
            let capture = self.capture.take().expect("checked above");
            let text = normalize_ws(&capture.buffer);
            if !text.is_empty() {
                match capture.target {
                    CaptureTarget::Title => self.current.title = Some(text),
                    CaptureTarget::Team => self.current.team = Some(text),
                    CaptureTarget::Location => self.current.location = Some(text),
                    CaptureTarget::LinkText => {
                        if let Some(link) = self.links.last_mut() {
                            link.text = text;
                        }
                    }
                }
            }
        }

        if self.in_card && self.depth < self.card_depth {
            if self.current.is_viable() {
                self.jobs.push(std::mem::take(&mut self.current));
            } else {
                self.current = JobRecord::default();
            }
            self.in_card = false;
        }
    }
}

/// Run the structural scan over one document.
///
/// Pure and idempotent: identical input text always yields an identical
/// outcome, records in document order, no deduplication applied.
pub fn scan_listing(html: &str) -> ScanOutcome {
    let mut scanner = ListingScanner::new();
    let mut aborted = None;

    for event in Tokenizer::new(html) {
        match event {
            Event::Start {
                name,
                class,
                href,
                self_closing,
            } => {
                scanner.on_start(&name, &class, &href, self_closing);
                if scanner.depth > MAX_DEPTH {
                    debug!(depth = scanner.depth, "nesting limit hit, keeping partial scan");
                    aborted = Some(format!("nesting exceeded {MAX_DEPTH} open elements"));
                    break;
                }
            }
            Event::Text(text) => scanner.on_text(&text),
            Event::End { name } => scanner.on_end(&name),
        }
    }

    ScanOutcome {
        jobs: scanner.jobs,
        links: scanner.links,
        aborted,
    }
}
