//! Drives the composers against a surface that prints every mutation.
//!
//! Run with `RUST_LOG=debug` to also see the engine's own logging.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use concat_core::{
    Completion, ConcatDataSource, DataSource, DiffableSection, IndexPath, RowAnimation,
    SectionHandle, Snapshot, StaticSection, Surface,
};

const EMOJIS: [char; 16] = [
    '🍎', '🍌', '🍒', '🍇', '🍉', '🍋', '🍑', '🍍', '🥝', '🥥', '🍓', '🫐', '🍈', '🍐', '🍊', '🥭',
];

#[derive(Default)]
struct ConsoleSurface {
    depth: usize,
}

impl ConsoleSurface {
    fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn print(&self, line: impl fmt::Display) {
        println!("{}{line}", "  ".repeat(self.depth + 1));
    }
}

fn paths(paths: &[IndexPath]) -> String {
    let rendered: Vec<String> = paths.iter().map(ToString::to_string).collect();
    rendered.join(" ")
}

impl Surface for ConsoleSurface {
    type Cell = String;
    type View = String;

    fn run_transaction(
        &mut self,
        animated: bool,
        completion: Option<Completion>,
        body: impl FnOnce(&mut Self),
    ) -> Option<Completion> {
        self.print(if animated {
            "transaction (animated)"
        } else {
            "transaction"
        });
        self.depth += 1;
        body(self);
        self.depth -= 1;
        // Printing is the commit, so the completion can run right away.
        completion
    }

    fn begin_batch(&mut self) {
        self.print("batch {");
        self.depth += 1;
    }

    fn end_batch(&mut self) {
        self.depth -= 1;
        self.print("}");
    }

    fn insert_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.print(format_args!("insert sections {sections:?} ({animation:?})"));
    }

    fn delete_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.print(format_args!("delete sections {sections:?} ({animation:?})"));
    }

    fn move_section(&mut self, from: usize, to: usize) {
        self.print(format_args!("move section {from} -> {to}"));
    }

    fn reload_sections(&mut self, sections: &[usize], animation: RowAnimation) {
        self.print(format_args!("reload sections {sections:?} ({animation:?})"));
    }

    fn insert_items(&mut self, items: &[IndexPath], animation: RowAnimation) {
        self.print(format_args!("insert rows {} ({animation:?})", paths(items)));
    }

    fn delete_items(&mut self, items: &[IndexPath], animation: RowAnimation) {
        self.print(format_args!("delete rows {} ({animation:?})", paths(items)));
    }

    fn move_item(&mut self, from: IndexPath, to: IndexPath) {
        self.print(format_args!("move row {from} -> {to}"));
    }

    fn reload_items(&mut self, items: &[IndexPath], animation: RowAnimation) {
        self.print(format_args!("reload rows {} ({animation:?})", paths(items)));
    }

    fn full_reload(&mut self) {
        self.print("reload everything");
    }

    fn deselect_item(&mut self, path: IndexPath, animated: bool) {
        self.print(format_args!("deselect {path} (animated: {animated})"));
    }
}

fn dump(surface: &Rc<RefCell<ConsoleSurface>>, root: &ConcatDataSource<ConsoleSurface>) {
    let mut surface = surface.borrow_mut();
    for section in 0..root.section_count() {
        let title = root
            .title_for_header(section)
            .unwrap_or_else(|| format!("section {section}"));
        let rows: Vec<String> = (0..root.item_count(section))
            .map(|item| root.render(&mut surface, IndexPath::new(section, item)))
            .collect();
        println!("  {title}: {}", rows.join(" | "));
    }
}

/// Tickets and players compare by name only, so a changed score is a
/// reload rather than a replacement.
#[derive(Debug, Clone)]
struct Ticket {
    name: &'static str,
    point: u32,
}

impl PartialEq for Ticket {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ticket {}

impl Hash for Ticket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone)]
struct Player {
    name: &'static str,
    score: u32,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

type Scoreboard = DiffableSection<Player, ConsoleSurface>;

/// Adds the ticket's points to its player and re-sorts the scoreboard.
fn award(players: &Scoreboard, ticket: &Ticket) {
    let mut snapshot = players.snapshot();
    let mut updated = snapshot.items();
    for player in &mut updated {
        if player.name == ticket.name {
            player.score += ticket.point;
            snapshot.reload_items([player.clone()]);
        }
    }
    updated.sort_by(|left, right| right.score.cmp(&left.score));
    snapshot.delete_all();
    snapshot.append(updated);

    let name = ticket.name;
    players.apply(
        snapshot,
        true,
        Some(Box::new(move || log::info!("scoreboard updated for {name}"))),
    );
}

fn tickets_demo() {
    println!("== tickets ==");
    let surface = ConsoleSurface::shared();
    let root = ConcatDataSource::new(&surface);

    let players = Rc::new(Scoreboard::new(|_, _, player| {
        Some(format!("{} {}", player.name, player.score))
    }));
    players.set_header_title(Some("Players".to_string()));
    players.set_default_row_animation(RowAnimation::Fade);

    let tickets = Rc::new(DiffableSection::<Ticket, ConsoleSurface>::new(|_, _, ticket| {
        Some(format!("{} +{}", ticket.name, ticket.point))
    }));
    tickets.set_header_title(Some("Tickets".to_string()));
    let scoreboard = Rc::clone(&players);
    tickets.set_selection_handler(move |ticket| award(&scoreboard, ticket));

    let mut snapshot = tickets.empty_snapshot();
    snapshot.append([("A", 3), ("B", 7), ("C", 1), ("D", 5)].map(|(name, point)| Ticket { name, point }));
    tickets.apply(snapshot, false, None);

    let mut snapshot = players.empty_snapshot();
    snapshot.append(["A", "B", "C", "D"].map(|name| Player { name, score: 0 }));
    players.apply(snapshot, false, None);

    let mut sections = root.empty_snapshot();
    sections.append([
        SectionHandle::from(Rc::clone(&tickets)),
        SectionHandle::from(Rc::clone(&players)),
    ]);
    root.apply(sections, false, None);
    dump(&surface, &root);

    for item in [1, 3, 1, 2] {
        println!("-- select ticket {item}");
        root.did_select_item(IndexPath::new(0, item));
        dump(&surface, &root);
    }
}

type EmojiSection = DiffableSection<char, ConsoleSurface>;

fn pick(offset: usize, count: usize) -> Vec<char> {
    (0..count)
        .map(|index| EMOJIS[(offset + index * 5) % EMOJIS.len()])
        .collect()
}

fn emoji_section(title: &str, emojis: Vec<char>) -> Rc<EmojiSection> {
    let section = Rc::new(EmojiSection::new(|_, _, emoji| Some(emoji.to_string())));
    section.set_header_title(Some(title.to_string()));
    section.apply(emojis.into_iter().collect(), false, None);
    section
}

fn shuffle(round: usize, sections: &[Rc<EmojiSection>; 3]) {
    let [first, second, third] = sections;

    first.apply(pick(round * 3, 4).into_iter().collect(), true, None);

    let mut snapshot = second.snapshot();
    for emoji in snapshot.items() {
        let head = snapshot.items()[0];
        snapshot.move_before(&emoji, &head);
    }
    second.apply(snapshot, true, None);

    let mut snapshot = third.snapshot();
    let items = snapshot.items();
    snapshot.delete(&items[..items.len() / 2]);
    let fresh: Vec<char> = pick(round * 7 + 1, round % 3 + 1)
        .into_iter()
        .filter(|emoji| !snapshot.contains(emoji))
        .collect();
    snapshot.append(fresh);
    third.apply(snapshot, true, None);
}

fn emojis_demo() {
    println!("== emojis ==");
    let root: Rc<ConcatDataSource<ConsoleSurface>> = ConcatDataSource::detached();
    let banner = Rc::new(StaticSection::<ConsoleSurface>::new(1, |_, _| {
        Some("~ fruit stand ~".to_string())
    }));
    let sections = [
        emoji_section("Carousel", pick(0, 4)),
        emoji_section("Pages", pick(4, 8)),
        emoji_section("List", pick(9, 4)),
    ];

    let mut order: Vec<SectionHandle<ConsoleSurface>> = sections
        .iter()
        .map(|section| SectionHandle::from(Rc::clone(section)))
        .collect();
    let compose = |order: &[SectionHandle<ConsoleSurface>]| {
        let mut snapshot: Snapshot<SectionHandle<ConsoleSurface>> = Snapshot::new();
        snapshot.append([SectionHandle::from(Rc::clone(&banner))]);
        snapshot.append(order.iter().cloned());
        snapshot
    };
    root.apply(compose(&order), false, None);

    let surface = ConsoleSurface::shared();
    if let Err(err) = root.attach(&surface) {
        log::error!("could not attach the emoji board: {err}");
        return;
    }
    dump(&surface, &root);

    for round in 1..=3 {
        println!("-- shuffle {round}");
        shuffle(round, &sections);
        order.rotate_left(1);
        root.apply(compose(&order), true, None);
        dump(&surface, &root);
    }
}

fn main() {
    env_logger::init();
    log::info!("starting console demo");

    tickets_demo();
    println!();
    emojis_demo();
}
