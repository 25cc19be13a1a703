//! Interactive, headless session driver.
//!
//! Stands in for the hosting view: it renders the engine's `LessonView` to
//! the terminal, forwards learner commands as messages, and executes the
//! returned effects. Asynchronous collaborators are scripted so their
//! behavior is observable from the prompt: an utterance advances one word
//! per `tick`, and timers and submissions resolve on the tick after they
//! were issued.

use crate::content::{SubmissionKind, TextStyle};
use crate::engine::{
    CompletionState, Effect, LessonEngine, Message, QuizProgress, RenderNode, SubmissionPayload,
    SubmissionStatus,
};
use crate::text_utils::word_start_offsets;
use anyhow::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

pub struct SessionDriver {
    engine: LessonEngine,
    utterance: Option<ScriptedUtterance>,
    pending: VecDeque<PendingEvent>,
}

/// One in-flight speech operation, advanced word by word on `tick`.
struct ScriptedUtterance {
    generation: u64,
    word_starts: Vec<usize>,
    next_word: usize,
}

enum PendingEvent {
    QuizTimer {
        block_idx: usize,
    },
    Submission {
        block_idx: usize,
        request_id: u64,
        payload: SubmissionPayload,
    },
    Completion,
}

impl SessionDriver {
    pub fn new(engine: LessonEngine) -> Self {
        SessionDriver {
            engine,
            utterance: None,
            pending: VecDeque::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.print_banner();
        self.print_view();

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            if crate::take_sigint_requested() {
                info!("Interrupt received; tearing down session");
                self.teardown();
                break;
            }
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                self.teardown();
                break;
            };
            if !self.handle_command(line?.trim()) {
                self.teardown();
                break;
            }
        }
        Ok(())
    }

    fn teardown(&mut self) {
        for effect in self.engine.teardown() {
            self.execute(effect);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return true;
        };

        match command {
            "show" => self.print_view(),
            "read" => self.dispatch(Message::ToggleReadAloud),
            "stop" => self.dispatch(Message::StopReadAloud),
            "autoscroll" => self.dispatch(Message::ToggleAutoScroll),
            "speed" => match parts.next().and_then(|raw| raw.parse::<f32>().ok()) {
                Some(speed) => self.dispatch(Message::SetAutoScrollSpeed(speed)),
                None => println!("usage: speed <multiplier>"),
            },
            "tick" => {
                let count = parts
                    .next()
                    .and_then(|raw| raw.parse::<usize>().ok())
                    .unwrap_or(1);
                for _ in 0..count {
                    self.tick();
                }
            }
            "quiz" => match (parse_index(&mut parts), parse_index(&mut parts)) {
                (Some(block_idx), Some(option_idx)) => self.dispatch(Message::QuizOptionSelected {
                    block_idx,
                    option_idx,
                }),
                _ => println!("usage: quiz <block> <option>"),
            },
            "choose" => match (parse_index(&mut parts), parts.next().and_then(parse_kind)) {
                (Some(block_idx), Some(kind)) => {
                    self.dispatch(Message::AssignmentModalityChosen { block_idx, kind })
                }
                _ => println!("usage: choose <block> <text|file|link>"),
            },
            "submit" => match parse_submission(&mut parts) {
                Some((block_idx, payload)) => {
                    self.dispatch(Message::AssignmentSubmitted { block_idx, payload })
                }
                None => println!(
                    "usage: submit <block> text <body...> | file <name> <bytes> | link <url>"
                ),
            },
            "skip" => match parse_index(&mut parts) {
                Some(block_idx) => self.dispatch(Message::AssignmentSkipped { block_idx }),
                None => println!("usage: skip <block>"),
            },
            "focus" => match parse_index(&mut parts) {
                Some(block_idx) => self.dispatch(Message::BlockFocused { block_idx }),
                None => println!("usage: focus <block>"),
            },
            "scroll" => {
                let mut next_f32 = || parts.next().and_then(|raw| raw.parse::<f32>().ok());
                match (next_f32(), next_f32(), next_f32()) {
                    (Some(scroll_top), Some(viewport_height), Some(content_height)) => self
                        .dispatch(Message::Scrolled {
                            scroll_top,
                            viewport_height,
                            content_height,
                        }),
                    _ => println!("usage: scroll <top> <viewport-height> <content-height>"),
                }
            }
            "grab" => self.dispatch(Message::ScrollGestureStarted),
            "release" => self.dispatch(Message::ScrollGestureEnded),
            "complete" => self.dispatch(Message::CompleteLesson),
            "help" => print_help(),
            "quit" | "exit" => return false,
            other => println!("unknown command `{other}`; try `help`"),
        }
        true
    }

    fn dispatch(&mut self, message: Message) {
        for effect in self.engine.handle(message) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Speak {
                generation,
                block_id,
                text,
                rate,
            } => {
                println!("[speech] speaking {block_id} at {rate}x: {:?}", preview(&text));
                self.utterance = Some(ScriptedUtterance {
                    generation,
                    word_starts: word_start_offsets(&text),
                    next_word: 0,
                });
            }
            Effect::CancelSpeech => {
                if self.utterance.take().is_some() {
                    println!("[speech] canceled in-flight utterance");
                }
            }
            Effect::ScheduleQuizUnlock { block_idx, delay } => {
                println!(
                    "[timer] {}ms feedback delay for block {block_idx}; fires on next tick",
                    delay.as_millis()
                );
                self.pending.push_back(PendingEvent::QuizTimer { block_idx });
            }
            Effect::SubmitAssignment {
                block_idx,
                request_id,
                payload,
            } => {
                println!(
                    "[upload] block {block_idx} request {request_id}: {}",
                    describe_payload(&payload)
                );
                self.pending.push_back(PendingEvent::Submission {
                    block_idx,
                    request_id,
                    payload,
                });
            }
            Effect::ScrollTo { offset_px } => println!("[scroll] viewport -> {offset_px:.1}px"),
            Effect::RevealHighlight { block_id } => {
                println!(
                    "[scroll] nudging {} to the nearest viewport edge",
                    block_id.as_str()
                );
            }
            Effect::UpdateAiContext { text } => {
                println!("[ai-context] {:?}", preview(&text));
            }
            Effect::MarkNodeComplete { node_id } => {
                println!("[progress] marking {node_id} complete; resolves on next tick");
                self.pending.push_back(PendingEvent::Completion);
            }
        }
    }

    /// One cooperative step: settle everything queued last step, then advance
    /// the scripted utterance by a single word.
    fn tick(&mut self) {
        let mut messages = Vec::new();
        for event in self.pending.drain(..) {
            messages.push(match event {
                PendingEvent::QuizTimer { block_idx } => Message::QuizFeedbackElapsed { block_idx },
                PendingEvent::Submission {
                    block_idx,
                    request_id,
                    payload,
                } => Message::SubmissionResolved {
                    block_idx,
                    request_id,
                    error: submission_outcome(&payload),
                },
                PendingEvent::Completion => Message::CompletionResolved {
                    success: true,
                    next_node_id: None,
                },
            });
        }

        if let Some(utterance) = &mut self.utterance {
            if utterance.next_word < utterance.word_starts.len() {
                let char_index = utterance.word_starts[utterance.next_word];
                utterance.next_word += 1;
                messages.push(Message::SpeechBoundary {
                    generation: utterance.generation,
                    char_index,
                });
            } else {
                let generation = utterance.generation;
                self.utterance = None;
                messages.push(Message::SpeechFinished { generation });
            }
        }

        if messages.is_empty() {
            debug!("Tick with nothing queued");
        }
        for message in messages {
            self.dispatch(message);
        }
    }

    fn print_banner(&self) {
        println!(
            "Lesson: {} [{}]: {} blocks. Type `help` for commands.",
            self.engine.title(),
            self.engine.node_id(),
            self.engine.blocks().len()
        );
        if let Some(metadata) = self.engine.metadata() {
            if let Some(objectives) = &metadata.objectives {
                for objective in objectives {
                    println!("  objective: {objective}");
                }
            }
            if let Some(references) = &metadata.references {
                println!("  references: {}", references.join("; "));
            }
            if metadata.teacher_context.is_some() {
                debug!("Lesson carries teacher context (not shown to learners)");
            }
        }
    }

    fn print_view(&self) {
        let view = self.engine.view();
        for block in &view.nodes {
            for (line_no, line) in render_lines(&block.node).into_iter().enumerate() {
                if line_no == 0 {
                    println!("{:>3}  {line}", block.index);
                } else {
                    println!("     {line}");
                }
            }
        }
        if view.locked_notice {
            println!("     [locked] complete the gate above to continue");
        }
        if view.can_complete && matches!(self.engine.completion(), CompletionState::NotRequested) {
            println!("     [end] every block is revealed; `complete` finishes the lesson");
        }
        println!(
            "     -- visible through block {}; reading: {}; auto-scroll: {} --",
            self.engine.unlocked_index(),
            self.engine.is_reading(),
            self.engine.is_auto_scrolling()
        );
        if let Some(highlight) = &view.highlight {
            println!(
                "     [reading] block {} at char {:?}",
                highlight.block_id, highlight.char_index
            );
        }
        match self.engine.completion() {
            CompletionState::Completed { next_node_id } => match next_node_id {
                Some(next) => println!("     [done] next lesson: {next}"),
                None => println!("     [done] back to the course overview"),
            },
            CompletionState::Failed => println!("     [done] completion failed; try again"),
            _ => {}
        }
    }
}

/// Textual rendering of one block node, one string per terminal line.
fn render_lines(node: &RenderNode) -> Vec<String> {
    match node {
        RenderNode::Paragraph {
            content,
            style,
            citations,
        } => {
            let mut lines = vec![format!("{} {}", style_marker(*style), preview(content))];
            for citation in citations {
                match &citation.url {
                    Some(url) => lines.push(format!("    cite: {} <{url}>", citation.text)),
                    None => lines.push(format!("    cite: {}", citation.text)),
                }
            }
            lines
        }
        RenderNode::Figure {
            url,
            alt,
            caption,
            size,
        } => {
            let mut lines = vec![format!("[image:{size:?}] {url}")];
            if let Some(alt) = alt {
                lines.push(format!("  alt: {alt}"));
            }
            if let Some(caption) = caption {
                lines.push(format!("  caption: {caption}"));
            }
            lines
        }
        RenderNode::QuizCard {
            question,
            options,
            explanation,
            progress,
        } => {
            let mut lines = vec![format!("[quiz] {question}")];
            for (idx, option) in options.iter().enumerate() {
                lines.push(format!("  ({idx}) {option}"));
            }
            match progress {
                QuizProgress::Unanswered => lines.push("  status: unanswered".to_string()),
                QuizProgress::Incorrect { last_choice } => {
                    lines.push(format!("  status: incorrect (picked {last_choice}); try again"));
                }
                QuizProgress::Correct { choice, .. } => {
                    lines.push(format!("  status: correct (picked {choice})"));
                    if let Some(explanation) = explanation {
                        lines.push(format!("  why: {explanation}"));
                    }
                }
            }
            lines
        }
        RenderNode::SimulationFrame {
            simulation_id,
            config,
            instructions,
        } => {
            let configured = if config.is_some() { " (configured)" } else { "" };
            let mut lines = vec![format!("[simulation] {simulation_id}{configured}")];
            if let Some(instructions) = instructions {
                lines.push(format!("  {instructions}"));
            }
            lines
        }
        RenderNode::ComingSoon { simulation_id } => {
            vec![format!("[simulation] {simulation_id} (coming soon)")]
        }
        RenderNode::AssignmentCard {
            title,
            description,
            instructions,
            submission_types,
            max_file_size,
            progress,
            skippable,
        } => {
            let kinds = submission_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("/");
            let mut lines = vec![format!(
                "[assignment] {title}: submit via {kinds}{}",
                if *skippable { ", skippable" } else { "" }
            )];
            if let Some(description) = description {
                lines.push(format!("  {description}"));
            }
            if let Some(instructions) = instructions {
                lines.push(format!("  {instructions}"));
            }
            if let Some(limit) = max_file_size {
                lines.push(format!("  file limit: {limit} bytes"));
            }
            if let Some(kind) = &progress.chosen {
                lines.push(format!("  modality: {kind}"));
            }
            lines.push(format!("  status: {}", describe_status(&progress.status)));
            lines
        }
        RenderNode::Divider { style } => vec![format!("[divider:{style:?}]")],
        RenderNode::InsightPanel {
            prompt,
            context,
            summary,
            show_simulation,
        } => {
            let mut lines = vec!["[insight]".to_string()];
            if let Some(summary) = summary {
                lines.push(format!("  summary: {summary}"));
            }
            if let Some(prompt) = prompt {
                lines.push(format!("  prompt: {prompt}"));
            }
            if let Some(context) = context {
                lines.push(format!("  context: {}", preview(context)));
            }
            if *show_simulation {
                lines.push("  (embedded simulation requested)".to_string());
            }
            lines
        }
        RenderNode::AnimationFrame {
            format,
            url,
            autoplay,
            loop_animation,
            caption,
        } => {
            let mut flags = Vec::new();
            if *autoplay {
                flags.push("autoplay");
            }
            if *loop_animation {
                flags.push("loop");
            }
            let mut lines = vec![format!(
                "[animation:{format:?}] {url}{}",
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", flags.join(", "))
                }
            )];
            if let Some(caption) = caption {
                lines.push(format!("  caption: {caption}"));
            }
            lines
        }
    }
}

fn style_marker(style: TextStyle) -> &'static str {
    match style {
        TextStyle::Paragraph => "¶",
        TextStyle::Heading => "#",
        TextStyle::Subheading => "##",
        TextStyle::Callout => "!",
    }
}

fn describe_status(status: &SubmissionStatus) -> String {
    match status {
        SubmissionStatus::NotSubmitted => "not submitted".to_string(),
        SubmissionStatus::Rejected { reason } => format!("rejected: {reason}"),
        SubmissionStatus::InFlight { request_id } => format!("in flight (request {request_id})"),
        SubmissionStatus::Failed { error } => format!("failed: {error}; retry available"),
        SubmissionStatus::Accepted => "accepted".to_string(),
    }
}

fn describe_payload(payload: &SubmissionPayload) -> String {
    match payload {
        SubmissionPayload::Text { body } => format!("text ({} chars)", body.chars().count()),
        SubmissionPayload::File { name, size_bytes } => format!("file {name} ({size_bytes} bytes)"),
        SubmissionPayload::Link { url } => format!("link {url}"),
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 60;
    let mut out: String = text.chars().take(LIMIT).collect();
    if text.chars().count() > LIMIT {
        out.push('…');
    }
    out
}

/// Deterministic fake transport: file names containing "fail" error out so
/// the retry path can be exercised from the prompt.
fn submission_outcome(payload: &SubmissionPayload) -> Option<String> {
    match payload {
        SubmissionPayload::File { name, .. } if name.contains("fail") => {
            Some("storage unavailable".to_string())
        }
        _ => None,
    }
}

fn parse_submission<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Option<(usize, SubmissionPayload)> {
    let block_idx = parse_index(parts)?;
    let payload = match parts.next()? {
        "text" => SubmissionPayload::Text {
            body: parts.collect::<Vec<_>>().join(" "),
        },
        "file" => SubmissionPayload::File {
            name: parts.next()?.to_string(),
            size_bytes: parts.next()?.parse().ok()?,
        },
        "link" => SubmissionPayload::Link {
            url: parts.next()?.to_string(),
        },
        _ => return None,
    };
    Some((block_idx, payload))
}

fn parse_index<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<usize> {
    parts.next().and_then(|raw| raw.parse().ok())
}

fn parse_kind(raw: &str) -> Option<SubmissionKind> {
    match raw {
        "text" => Some(SubmissionKind::Text),
        "file" => Some(SubmissionKind::File),
        "link" => Some(SubmissionKind::Link),
        _ => None,
    }
}

fn print_help() {
    println!(
        "\
commands:
  show                               render the visible blocks
  read | stop                        toggle / stop read-aloud
  autoscroll                         toggle auto-scroll
  speed <multiplier>                 set the auto-scroll speed
  tick [n]                           advance scripted time by n steps
  quiz <block> <option>              answer a quiz option
  choose <block> <text|file|link>    pick an assignment modality
  submit <block> text <body...>      submit assignment text
  submit <block> file <name> <bytes> submit an assignment file
  submit <block> link <url>          submit an assignment link
  skip <block>                       skip an assignment
  focus <block>                      mark a block as the reading focus
  scroll <top> <vh> <ch>             report viewport geometry
  grab | release                     begin / end a manual scroll gesture
  complete                           mark the lesson complete
  quit                               leave the session"
    );
}
