/*
  Haliax, a Tak engine.
  Copyright (C) 2022 The Haliax Authors (see AUTHORS.md file)

  Haliax is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Haliax is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! State representations of positions, with move application and reversal,
//! terminal detection, and TPS conversion.

use super::{
    zobrist, Bitboard, Color, Move, MoveError, ParseError, Piece, Square, Stack, StoneKind,
};

use std::fmt::{Display, Formatter};

/// The number of flats and walls each player draws from.
pub const FLAT_RESERVE: u8 = 30;

/// The number of capstones each player owns.
pub const CAPSTONE_RESERVE: u8 = 1;

/// The size of the per-ply crush ring.
/// Must strictly exceed the deepest chain of moves made without a matching
/// undo; the search caps its selection depth well inside this.
const CRUSH_RING: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The outcome classification of a position.
pub enum GameResult {
    /// The game continues.
    Ongoing,
    /// A player has connected two opposite edges with a road.
    RoadWin(Color),
    /// The board filled or a reserve emptied, and a player leads the flat
    /// count (after komi).
    FlatWin(Color),
    /// The board filled or a reserve emptied with the flat count level.
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A representation of a position: the stacks on each square, the bitboards
/// derived from their top pieces, both players' reserves, and the game
/// counters.
pub struct Position {
    /// The stack of pieces on each square.
    stacks: [Stack; 36],
    /// The squares whose top piece is White's and Black's, respectively.
    control: [Bitboard; 2],
    /// The squares bearing no pieces.
    empty: Bitboard,
    /// The squares whose top piece is a standing stone.
    standing: Bitboard,
    /// The squares whose top piece is a capstone.
    capstones: Bitboard,
    /// The flats and walls left in each player's reserve.
    flat_reserves: [u8; 2],
    /// The capstones left in each player's reserve.
    capstone_reserves: [u8; 2],
    /// The color of the player to move.
    to_move: Color,
    /// The number of plies played to reach this position.
    half_moves: u16,
    /// A saved incremental hash.
    /// If the position is valid, this value must always be equal to the
    /// output of `Position::fresh_hash`.
    hash: u64,
    /// The ring of per-ply crush flags, indexed by ply modulo [`CRUSH_RING`],
    /// consulted when a slide is undone.
    crushes: [bool; CRUSH_RING],
    /// The komi credited to Black in a flat count, in half-stones.
    half_komi: u8,
}

impl Position {
    #[must_use]
    /// Construct the empty starting position.
    ///
    /// # Examples
    ///
    /// ```
    /// use haliax::base::{Color, Position};
    ///
    /// let pos = Position::new();
    /// assert_eq!(pos.to_move(), Color::White);
    /// assert_eq!(pos.to_tps(), "[TPS x6/x6/x6/x6/x6/x6 1 1]");
    /// ```
    pub fn new() -> Position {
        Position {
            stacks: [Stack::new(); 36],
            control: [Bitboard::EMPTY; 2],
            empty: Bitboard::ALL,
            standing: Bitboard::EMPTY,
            capstones: Bitboard::EMPTY,
            flat_reserves: [FLAT_RESERVE; 2],
            capstone_reserves: [CAPSTONE_RESERVE; 2],
            to_move: Color::White,
            half_moves: 0,
            hash: 0,
            crushes: [false; CRUSH_RING],
            half_komi: 0,
        }
    }

    /* Accessors */

    #[must_use]
    /// Get the color of the player to move.
    pub const fn to_move(&self) -> Color {
        self.to_move
    }

    #[must_use]
    /// Get the number of plies played to reach this position.
    pub const fn half_moves(&self) -> u16 {
        self.half_moves
    }

    #[must_use]
    /// Get the saved Zobrist hash of this position.
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    /// Get the stack on a square.
    pub fn stack(&self, sq: Square) -> &Stack {
        &self.stacks[sq as usize]
    }

    #[must_use]
    /// Get the set of squares whose top piece belongs to `color`.
    pub const fn control(&self, color: Color) -> Bitboard {
        self.control[color as usize]
    }

    #[must_use]
    /// Get the set of squares bearing no pieces.
    pub const fn empty_squares(&self) -> Bitboard {
        self.empty
    }

    #[must_use]
    /// Get the set of squares whose top piece is a standing stone.
    pub const fn standing_stones(&self) -> Bitboard {
        self.standing
    }

    #[must_use]
    /// Get the set of squares whose top piece is a capstone.
    pub const fn capstone_squares(&self) -> Bitboard {
        self.capstones
    }

    #[must_use]
    /// Get the number of flats and walls left in `color`'s reserve.
    pub const fn flat_reserve(&self, color: Color) -> u8 {
        self.flat_reserves[color as usize]
    }

    #[must_use]
    /// Get the number of capstones left in `color`'s reserve.
    pub const fn capstone_reserve(&self, color: Color) -> u8 {
        self.capstone_reserves[color as usize]
    }

    #[must_use]
    /// Get the komi credited to Black, in half-stones.
    pub const fn half_komi(&self) -> u8 {
        self.half_komi
    }

    /// Set the komi credited to Black, in half-stones.
    /// Values above 10 are clamped.
    pub fn set_half_komi(&mut self, half_komi: u8) {
        self.half_komi = half_komi.min(10);
    }

    #[must_use]
    /// Get the color that a placement made right now would put on the board:
    /// the opponent of the mover during the first two plies of the game (the
    /// opening swap), and the mover afterward.
    pub const fn place_color(&self) -> Color {
        if self.half_moves < 2 {
            match self.to_move {
                Color::White => Color::Black,
                Color::Black => Color::White,
            }
        } else {
            self.to_move
        }
    }

    /* Move application */

    /// Apply the given move to the position.
    /// Will assume the move is legal.
    ///
    /// # Panics
    ///
    /// This function may or may not panic if `m` is not a legal move; it will
    /// never panic on a legal one.
    /// Use [`Position::try_make_move`] to validate first.
    pub fn make_move(&mut self, m: Move) {
        if m.is_place() {
            self.make_place(m.square(), m.kind());
        } else {
            self.make_slide(m);
        }
        self.to_move = !self.to_move;
        self.half_moves += 1;
        debug_assert_eq!(self.hash, self.fresh_hash());
    }

    /// Reverse the given move, which must be the most recent move applied to
    /// this position.
    ///
    /// # Panics
    ///
    /// This function may or may not panic if `m` was not the last move made;
    /// it will never panic when undo exactly mirrors the last make.
    pub fn undo_move(&mut self, m: Move) {
        self.half_moves -= 1;
        self.to_move = !self.to_move;
        if m.is_place() {
            self.undo_place(m.square(), m.kind());
        } else {
            self.undo_slide(m);
        }
        debug_assert_eq!(self.hash, self.fresh_hash());
    }

    /// Apply a placement of `kind` on `sq`.
    fn make_place(&mut self, sq: Square, kind: StoneKind) {
        let color = self.place_color();
        self.stacks[sq as usize].push(Piece::new(color, kind));

        self.empty.remove(sq);
        self.control[color as usize].insert(sq);
        match kind {
            StoneKind::Flat => {}
            StoneKind::Standing => self.standing.insert(sq),
            StoneKind::Capstone => self.capstones.insert(sq),
        }

        if kind == StoneKind::Capstone {
            self.capstone_reserves[color as usize] -= 1;
        } else {
            self.flat_reserves[color as usize] -= 1;
        }

        self.crushes[self.half_moves as usize % CRUSH_RING] = false;
        self.hash ^= zobrist::piece_key(sq, color, kind, 0);
    }

    /// Reverse a placement of `kind` on `sq`.
    /// The turn counters have already been stepped back.
    fn undo_place(&mut self, sq: Square, kind: StoneKind) {
        let color = self.place_color();
        let piece = self.stacks[sq as usize].pop();
        debug_assert_eq!(piece, Piece::new(color, kind));

        self.refresh_square(sq);
        if kind == StoneKind::Capstone {
            self.capstone_reserves[color as usize] += 1;
        } else {
            self.flat_reserves[color as usize] += 1;
        }
        self.hash ^= zobrist::piece_key(sq, color, kind, 0);
    }

    /// Apply a slide move.
    fn make_slide(&mut self, m: Move) {
        let sq = m.square();
        let dir = m.direction();
        let pattern = m.pattern();
        let pickup = m.pickup();
        let steps = m.steps();

        let mut landings = [sq; 6];
        let mut cur = sq;
        for landing in landings.iter_mut().take(steps as usize) {
            cur = cur.next(dir).unwrap();
            *landing = cur;
        }
        let end = landings[steps as usize - 1];

        // hash out the old windowed contributions of every square we touch
        self.hash ^= self.square_hash(sq);
        for &landing in &landings[..steps as usize] {
            self.hash ^= self.square_hash(landing);
        }

        // lift the carried slice off the source, bottom-to-top order
        let source_height = self.stacks[sq as usize].len();
        let mut slice = [Piece::new(Color::White, StoneKind::Flat); 6];
        for (i, dst) in slice.iter_mut().take(pickup as usize).enumerate() {
            *dst = self.stacks[sq as usize]
                .get(source_height - pickup + i as u8)
                .unwrap();
        }
        self.stacks[sq as usize].truncate_top(pickup);

        // a wall at the endpoint is flattened by the lone capstone drop
        let crush = self.stacks[end as usize]
            .top()
            .is_some_and(|p| p.kind == StoneKind::Standing);
        if crush {
            self.stacks[end as usize].set_top_kind(StoneKind::Flat);
        }
        self.crushes[self.half_moves as usize % CRUSH_RING] = crush;

        // deal the slice out along the pattern
        let mut landing_idx = 0usize;
        let mut slice_idx = 0usize;
        for bit in (0..pickup).rev() {
            if pattern & (1 << bit) != 0 {
                landing_idx += 1;
            }
            self.stacks[landings[landing_idx - 1] as usize].push(slice[slice_idx]);
            slice_idx += 1;
        }

        self.refresh_square(sq);
        self.hash ^= self.square_hash(sq);
        for &landing in &landings[..steps as usize] {
            self.refresh_square(landing);
            self.hash ^= self.square_hash(landing);
        }
    }

    /// Reverse a slide move.
    /// The turn counters have already been stepped back.
    fn undo_slide(&mut self, m: Move) {
        let sq = m.square();
        let dir = m.direction();
        let pattern = m.pattern();
        let pickup = m.pickup();
        let steps = m.steps();

        let mut landings = [sq; 6];
        let mut cur = sq;
        for landing in landings.iter_mut().take(steps as usize) {
            cur = cur.next(dir).unwrap();
            *landing = cur;
        }
        let end = landings[steps as usize - 1];

        self.hash ^= self.square_hash(sq);
        for &landing in &landings[..steps as usize] {
            self.hash ^= self.square_hash(landing);
        }

        // count how many stones each landing square received
        let mut counts = [0u8; 6];
        let mut landing_idx = 0usize;
        for bit in (0..pickup).rev() {
            if pattern & (1 << bit) != 0 {
                landing_idx += 1;
            }
            counts[landing_idx - 1] += 1;
        }

        // pop the dropped stones back off, last landing first, rebuilding the
        // carried slice in its original bottom-to-top order
        let mut slice = [Piece::new(Color::White, StoneKind::Flat); 6];
        let mut slice_idx = pickup as usize;
        for j in (0..steps as usize).rev() {
            for _ in 0..counts[j] {
                slice_idx -= 1;
                slice[slice_idx] = self.stacks[landings[j] as usize].pop();
            }
        }

        // if this ply crushed, the piece now atop the endpoint is the
        // flattened wall; stand it back up
        let ring_slot = self.half_moves as usize % CRUSH_RING;
        if self.crushes[ring_slot] {
            self.stacks[end as usize].set_top_kind(StoneKind::Standing);
            self.crushes[ring_slot] = false;
        }

        for &piece in &slice[..pickup as usize] {
            self.stacks[sq as usize].push(piece);
        }

        self.refresh_square(sq);
        self.hash ^= self.square_hash(sq);
        for &landing in &landings[..steps as usize] {
            self.refresh_square(landing);
            self.hash ^= self.square_hash(landing);
        }
    }

    /// Apply the given move after validating it.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` and leave the position untouched if
    /// `m` is not legal here.
    pub fn try_make_move(&mut self, m: Move) -> Result<(), MoveError> {
        self.validate_move(m)?;
        self.make_move(m);
        Ok(())
    }

    /// Reverse the given move after validating that it plausibly was the
    /// most recent move.
    /// The check is structural: it verifies that the dropped stones are where
    /// the move says it left them, not that the whole game history matches.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` and leave the position untouched if
    /// `m` cannot be reversed from this position.
    pub fn try_undo_move(&mut self, m: Move) -> Result<(), MoveError> {
        self.validate_undo(m)?;
        self.undo_move(m);
        Ok(())
    }

    /// Check whether `m` is legal in this position.
    fn validate_move(&self, m: Move) -> Result<(), MoveError> {
        let sq = m.square();
        if m.is_place() {
            if !self.empty.contains(sq) {
                return Err(MoveError::InvalidPosition);
            }
            let kind = m.kind();
            if self.half_moves < 2 && kind != StoneKind::Flat {
                return Err(MoveError::InvalidStone);
            }
            let color = self.place_color();
            let available = if kind == StoneKind::Capstone {
                self.capstone_reserves[color as usize]
            } else {
                self.flat_reserves[color as usize]
            };
            if available == 0 {
                return Err(MoveError::InvalidCount);
            }
            return Ok(());
        }

        if self.half_moves < 2 {
            return Err(MoveError::InvalidSlide);
        }
        let stack = &self.stacks[sq as usize];
        let top = stack.top().ok_or(MoveError::InvalidPosition)?;
        if top.color != self.to_move {
            return Err(MoveError::InvalidColor);
        }
        let pickup = m.pickup();
        if pickup > 6 {
            return Err(MoveError::InvalidPattern);
        }
        if pickup > stack.len() {
            return Err(MoveError::InvalidCount);
        }

        // walk the landings: intermediates must be clear of walls and
        // capstones, and the endpoint may hold a wall only for a lone
        // capstone drop
        let dir = m.direction();
        let steps = m.steps();
        let mut cur = sq;
        for i in 1..=steps {
            cur = cur.next(dir).ok_or(MoveError::InvalidSlide)?;
            if self.capstones.contains(cur) {
                return Err(MoveError::InvalidSlide);
            }
            if self.standing.contains(cur) {
                if i < steps {
                    return Err(MoveError::InvalidSlide);
                }
                // ending on a wall: must be a crush by a lone capstone
                if top.kind != StoneKind::Capstone || m.pattern() & 1 != 1 {
                    return Err(MoveError::InvalidCrush);
                }
            }
        }
        Ok(())
    }

    /// Check whether `m` can be structurally reversed from this position.
    fn validate_undo(&self, m: Move) -> Result<(), MoveError> {
        if self.half_moves == 0 {
            return Err(MoveError::InvalidPosition);
        }
        let sq = m.square();
        if m.is_place() {
            let stack = &self.stacks[sq as usize];
            if stack.len() != 1 {
                return Err(MoveError::InvalidPosition);
            }
            let top = stack.top().unwrap();
            if top.kind != m.kind() {
                return Err(MoveError::InvalidStone);
            }
            // recompute the placing color as of the ply being undone
            let mover = if self.half_moves <= 2 {
                self.to_move
            } else {
                !self.to_move
            };
            if top.color != mover {
                return Err(MoveError::InvalidColor);
            }
            return Ok(());
        }

        let pickup = m.pickup();
        if pickup > 6 {
            return Err(MoveError::InvalidPattern);
        }
        let dir = m.direction();
        let steps = m.steps();

        let mut counts = [0u8; 6];
        let mut landing_idx = 0usize;
        for bit in (0..pickup).rev() {
            if m.pattern() & (1 << bit) != 0 {
                landing_idx += 1;
            }
            counts[landing_idx - 1] += 1;
        }

        let mut cur = sq;
        for i in 0..steps as usize {
            cur = cur.next(dir).ok_or(MoveError::InvalidSlide)?;
            if self.stacks[cur as usize].len() < counts[i] {
                return Err(MoveError::InvalidCount);
            }
        }
        Ok(())
    }

    /* Terminal detection */

    #[must_use]
    /// Classify this position as ongoing, won, or drawn.
    ///
    /// A road win goes to the player holding one; if both players hold one
    /// (possible when a slide uncovers the opponent's road while completing
    /// the mover's own), the player who made the last move wins.
    /// When no road exists and either the board is full or some player has
    /// placed every stone in their reserve, the flat count (with komi)
    /// decides.
    pub fn terminal(&self) -> GameResult {
        let white_road = self.has_road(Color::White);
        let black_road = self.has_road(Color::Black);
        match (white_road, black_road) {
            (true, true) => GameResult::RoadWin(!self.to_move),
            (true, false) => GameResult::RoadWin(Color::White),
            (false, true) => GameResult::RoadWin(Color::Black),
            (false, false) => {
                if self.empty.is_empty()
                    || self.reserves_exhausted(Color::White)
                    || self.reserves_exhausted(Color::Black)
                {
                    self.flat_result()
                } else {
                    GameResult::Ongoing
                }
            }
        }
    }

    #[must_use]
    /// Get the set of squares which count toward a road for `color`: those
    /// whose top piece is that player's flat or capstone.
    pub fn road_mask(&self, color: Color) -> Bitboard {
        self.control[color as usize] & !self.standing
    }

    #[must_use]
    /// Determine whether `color` has a road: a connected set of road-capable
    /// squares joining the north and south edges or the east and west edges.
    pub fn has_road(&self, color: Color) -> bool {
        let mask = self.road_mask(color);
        Position::connects(mask, &Bitboard::RANKS) || Position::connects(mask, &Bitboard::FILES)
    }

    /// Determine whether `mask` holds a connected path from `lines[0]` to
    /// `lines[5]`, where `lines` partitions the board into parallel lines.
    fn connects(mask: Bitboard, lines: &[Bitboard; 6]) -> bool {
        // a crossing touches every line; reject cheaply if one is untouched
        if lines.iter().any(|&line| (mask & line).is_empty()) {
            return false;
        }
        let far = lines[5];
        let mut reached = mask & lines[0];
        loop {
            let grown = reached | (reached.spread() & mask);
            if grown == reached {
                return (reached & far).is_nonempty();
            }
            reached = grown;
        }
    }

    /// Whether `color` has no stones left to place.
    fn reserves_exhausted(&self, color: Color) -> bool {
        self.flat_reserves[color as usize] == 0 && self.capstone_reserves[color as usize] == 0
    }

    /// Score a finished board by flats, with komi credited to Black.
    fn flat_result(&self) -> GameResult {
        let flats = |color: Color| {
            2 * u16::from((self.control[color as usize] & !self.standing & !self.capstones).len())
        };
        let white = flats(Color::White);
        let black = flats(Color::Black) + u16::from(self.half_komi);
        if white > black {
            GameResult::FlatWin(Color::White)
        } else if black > white {
            GameResult::FlatWin(Color::Black)
        } else {
            GameResult::Draw
        }
    }

    /* Hashing and consistency */

    /// Compute the windowed hash contribution of one square's stack.
    fn square_hash(&self, sq: Square) -> u64 {
        let stack = &self.stacks[sq as usize];
        let window = stack.len().min(zobrist::HASH_DEPTH);
        let mut h = 0;
        for depth in 0..window {
            let piece = stack.from_top(depth).unwrap();
            h ^= zobrist::piece_key(sq, piece.color, piece.kind, depth);
        }
        h
    }

    #[must_use]
    /// Compute the hash of this position from scratch.
    /// The result must always match the incrementally maintained `hash`.
    pub fn fresh_hash(&self) -> u64 {
        let mut h = 0;
        for sq_idx in 0..36u8 {
            h ^= self.square_hash(Square::try_from(sq_idx).unwrap());
        }
        h
    }

    /// Rebuild the bitboard bits of one square from its stack's top piece.
    fn refresh_square(&mut self, sq: Square) {
        self.control[0].remove(sq);
        self.control[1].remove(sq);
        self.standing.remove(sq);
        self.capstones.remove(sq);
        match self.stacks[sq as usize].top() {
            None => self.empty.insert(sq),
            Some(piece) => {
                self.empty.remove(sq);
                self.control[piece.color as usize].insert(sq);
                match piece.kind {
                    StoneKind::Flat => {}
                    StoneKind::Standing => self.standing.insert(sq),
                    StoneKind::Capstone => self.capstones.insert(sq),
                }
            }
        }
    }

    #[must_use]
    /// Check that every bitboard agrees with the per-square stacks.
    pub fn bitboards_consistent(&self) -> bool {
        let mut rebuilt = Position::new();
        rebuilt.stacks = self.stacks;
        for sq_idx in 0..36u8 {
            rebuilt.refresh_square(Square::try_from(sq_idx).unwrap());
        }
        rebuilt.control == self.control
            && rebuilt.empty == self.empty
            && rebuilt.standing == self.standing
            && rebuilt.capstones == self.capstones
    }

    /* TPS conversion */

    /// Parse a position from its TPS representation, with or without the
    /// surrounding `[TPS ...]` wrapper.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` if `s` is not well-formed TPS for
    /// a 6x6 board.
    ///
    /// # Examples
    ///
    /// ```
    /// use haliax::base::Position;
    ///
    /// let pos = Position::from_tps("[TPS x6/x6/x6/x6/x6/x6 1 1]").unwrap();
    /// assert_eq!(pos, Position::new());
    /// ```
    pub fn from_tps(s: &str) -> Result<Position, ParseError> {
        let mut body = s.trim();
        if let Some(stripped) = body.strip_prefix("[TPS") {
            body = stripped.strip_suffix(']').unwrap_or(stripped);
        }
        let mut fields = body.split_whitespace();
        let board = fields.next().ok_or(ParseError::MissingField)?;
        let turn = fields.next().ok_or(ParseError::MissingField)?;
        let move_number = fields.next().ok_or(ParseError::MissingField)?;

        let mut pos = Position::new();

        let rows: Vec<&str> = board.split('/').collect();
        if rows.len() != 6 {
            return Err(ParseError::BadRowCount(rows.len()));
        }
        for (row_idx, row) in rows.iter().enumerate() {
            // rows come top-to-bottom in TPS
            let rank = 5 - row_idx as u8;
            let mut file = 0u8;
            for cell in row.split(',') {
                if let Some(count) = cell.strip_prefix('x') {
                    let count: u8 = if count.is_empty() {
                        1
                    } else {
                        count
                            .parse()
                            .ok()
                            .filter(|&n| (1..=6).contains(&n))
                            .ok_or(ParseError::BadPieceToken('x'))?
                    };
                    file += count;
                    continue;
                }
                if file >= 6 {
                    return Err(ParseError::BadColumnCount(7));
                }
                let sq = Square::new(rank, file).unwrap();
                let mut closed = false;
                for c in cell.chars() {
                    if closed {
                        return Err(ParseError::BadStackModifier);
                    }
                    match c {
                        '1' => pos.stacks[sq as usize].push(Piece::new(Color::White, StoneKind::Flat)),
                        '2' => pos.stacks[sq as usize].push(Piece::new(Color::Black, StoneKind::Flat)),
                        'S' | 'C' => {
                            if pos.stacks[sq as usize].is_empty() {
                                return Err(ParseError::BadStackModifier);
                            }
                            let kind = if c == 'S' {
                                StoneKind::Standing
                            } else {
                                StoneKind::Capstone
                            };
                            pos.stacks[sq as usize].set_top_kind(kind);
                            closed = true;
                        }
                        _ => return Err(ParseError::BadPieceToken(c)),
                    }
                }
                if pos.stacks[sq as usize].is_empty() {
                    return Err(ParseError::BadPieceToken(','));
                }
                file += 1;
            }
            if file != 6 {
                return Err(ParseError::BadColumnCount(file as usize));
            }
        }

        pos.to_move = match turn {
            "1" => Color::White,
            "2" => Color::Black,
            _ => return Err(ParseError::BadTurn(turn.into())),
        };

        let move_number: u16 = move_number
            .parse()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| ParseError::BadMoveNumber(move_number.into()))?;
        pos.half_moves = (move_number - 1) * 2 + u16::from(pos.to_move == Color::Black);

        // rebuild everything the stacks imply
        for sq_idx in 0..36u8 {
            pos.refresh_square(Square::try_from(sq_idx).unwrap());
        }
        for color in Color::ALL {
            let mut flats = 0u8;
            let mut caps = 0u8;
            for stack in &pos.stacks {
                for piece in stack.iter() {
                    if piece.color == color {
                        if piece.kind == StoneKind::Capstone {
                            caps += 1;
                        } else {
                            flats += 1;
                        }
                    }
                }
            }
            pos.flat_reserves[color as usize] = FLAT_RESERVE.saturating_sub(flats);
            pos.capstone_reserves[color as usize] = CAPSTONE_RESERVE.saturating_sub(caps);
        }
        pos.hash = pos.fresh_hash();

        Ok(pos)
    }

    #[must_use]
    /// Construct the TPS representation of this position, including the
    /// `[TPS ...]` wrapper.
    /// Parsing the result reproduces this position exactly.
    pub fn to_tps(&self) -> String {
        let mut rows = Vec::with_capacity(6);
        for rank in (0..6u8).rev() {
            let mut cells: Vec<String> = Vec::with_capacity(6);
            let mut run = 0u8;
            for file in 0..6u8 {
                let sq = Square::new(rank, file).unwrap();
                let stack = &self.stacks[sq as usize];
                if stack.is_empty() {
                    run += 1;
                    continue;
                }
                if run > 0 {
                    cells.push(empty_run(run));
                    run = 0;
                }
                let mut cell = String::new();
                for piece in stack.iter() {
                    cell.push(match piece.color {
                        Color::White => '1',
                        Color::Black => '2',
                    });
                }
                match stack.top().unwrap().kind {
                    StoneKind::Flat => {}
                    StoneKind::Standing => cell.push('S'),
                    StoneKind::Capstone => cell.push('C'),
                }
                cells.push(cell);
            }
            if run > 0 {
                cells.push(empty_run(run));
            }
            rows.push(cells.join(","));
        }
        let turn = match self.to_move {
            Color::White => 1,
            Color::Black => 2,
        };
        format!(
            "[TPS {} {} {}]",
            rows.join("/"),
            turn,
            self.half_moves / 2 + 1
        )
    }
}

/// Format a run of `n` empty squares as a TPS cell.
fn empty_run(n: u8) -> String {
    if n == 1 {
        "x".into()
    } else {
        format!("x{n}")
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Display for Position {
    /// Render the board as a grid of top pieces, rank 6 first, with stack
    /// heights beside taller stacks.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rank in (0..6u8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..6u8 {
                let sq = Square::new(rank, file).unwrap();
                let stack = &self.stacks[sq as usize];
                match stack.top() {
                    None => write!(f, "   .")?,
                    Some(piece) => {
                        if stack.len() > 1 {
                            write!(f, " {}{piece}", stack.len())?;
                        } else {
                            write!(f, "  {piece}")?;
                        }
                    }
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   ----a---b---c---d---e---f")?;
        write!(
            f,
            "{:?} to move, ply {}",
            self.to_move, self.half_moves
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{movegen, tps};

    /// Check the reserve-conservation invariant for a position reachable
    /// from the start.
    fn assert_reserves_conserved(pos: &Position) {
        for color in Color::ALL {
            let mut flats = 0u8;
            let mut caps = 0u8;
            for sq_idx in 0..36u8 {
                let sq = Square::try_from(sq_idx).unwrap();
                for piece in pos.stack(sq).iter() {
                    if piece.color == color {
                        if piece.kind == StoneKind::Capstone {
                            caps += 1;
                        } else {
                            flats += 1;
                        }
                    }
                }
            }
            assert_eq!(flats + pos.flat_reserve(color), FLAT_RESERVE);
            assert_eq!(caps + pos.capstone_reserve(color), CAPSTONE_RESERVE);
        }
    }

    #[test]
    /// Test that the first two plies place the opponent's color (the opening
    /// swap), per scenario 2.
    fn opening_swap() {
        let mut pos = Position::new();
        pos.make_move(Move::from_ptn("a1").unwrap());
        pos.make_move(Move::from_ptn("f6").unwrap());

        assert_eq!(pos.half_moves(), 2);
        assert_eq!(pos.to_move(), Color::White);
        assert_eq!(
            pos.stack(Square::A1).top(),
            Some(Piece::new(Color::Black, StoneKind::Flat))
        );
        assert_eq!(
            pos.stack(Square::F6).top(),
            Some(Piece::new(Color::White, StoneKind::Flat))
        );
        assert!(pos.control(Color::Black).contains(Square::A1));
        assert!(pos.control(Color::White).contains(Square::F6));
        assert_eq!(pos.flat_reserve(Color::White), 29);
        assert_eq!(pos.flat_reserve(Color::Black), 29);
        assert_reserves_conserved(&pos);
    }

    #[test]
    /// Test that undoing the opening placements restores the empty board
    /// byte for byte.
    fn opening_round_trip() {
        let start = Position::new();
        let mut pos = start.clone();
        let a1 = Move::from_ptn("a1").unwrap();
        let f6 = Move::from_ptn("f6").unwrap();
        pos.make_move(a1);
        pos.make_move(f6);
        pos.undo_move(f6);
        pos.undo_move(a1);
        assert_eq!(pos, start);
    }

    #[test]
    /// Test a crushing slide and its undo, per scenario 6.
    fn crush_and_restore() {
        let mut pos = Position::from_tps(tps::CRUSH_READY_TPS).unwrap();
        let before = pos.clone();
        let m = Move::from_ptn("1a1+*").unwrap();

        pos.try_make_move(m).unwrap();
        assert_eq!(
            pos.stack(Square::A2).top(),
            Some(Piece::new(Color::White, StoneKind::Capstone))
        );
        assert_eq!(
            pos.stack(Square::A2).get(0),
            Some(Piece::new(Color::Black, StoneKind::Flat))
        );
        assert!(pos.standing_stones().is_empty());
        assert!(pos.stack(Square::A1).is_empty());

        pos.undo_move(m);
        assert_eq!(pos, before);
        assert_eq!(pos.hash(), before.hash());
        assert_eq!(
            pos.stack(Square::A2).top(),
            Some(Piece::new(Color::Black, StoneKind::Standing))
        );
    }

    #[test]
    /// Test a multi-square spread and its undo on a tall stack.
    fn spread_round_trip() {
        let mut pos = Position::from_tps(tps::TALL_STACK_TPS).unwrap();
        let before = pos.clone();
        // carry 4 from c3 east, dropping 2 on d3, 1 on e3, 1 on f3
        let m = Move::from_ptn("4c3>211").unwrap();
        pos.try_make_move(m).unwrap();

        assert_eq!(pos.stack(Square::C3).len(), 1);
        assert_eq!(pos.stack(Square::D3).len(), 2);
        assert_eq!(pos.stack(Square::E3).len(), 1);
        assert_eq!(
            pos.stack(Square::F3).top(),
            Some(Piece::new(Color::White, StoneKind::Capstone))
        );

        pos.undo_move(m);
        assert_eq!(pos, before);
    }

    #[test]
    /// Test that slides refuse to pass through or land on blockers
    /// illegally.
    fn slide_validation() {
        let mut pos = Position::from_tps(tps::CRUSH_READY_TPS).unwrap();
        // the flat under a wall cannot crush
        assert_eq!(
            Position::from_tps("[TPS x6/x6/x6/x6/2S,x5/1,x5 1 3]")
                .unwrap()
                .try_make_move(Move::from_ptn("1a1+").unwrap()),
            Err(MoveError::InvalidCrush)
        );
        // a capstone may not crush with a multi-stone final drop
        assert_eq!(
            Position::from_tps("[TPS x6/x6/x6/x6/2S,x5/11C,x5 1 3]")
                .unwrap()
                .try_make_move(Move::from_ptn("2a1+").unwrap()),
            Err(MoveError::InvalidCrush)
        );
        // sliding off the board
        assert_eq!(
            pos.try_make_move(Move::from_ptn("1a1-").unwrap()),
            Err(MoveError::InvalidSlide)
        );
        // sliding a stack we don't control
        assert_eq!(
            pos.try_make_move(Move::from_ptn("1a2+").unwrap()),
            Err(MoveError::InvalidColor)
        );
        // picking up more than the stack holds
        assert_eq!(
            pos.try_make_move(Move::from_ptn("2a1+").unwrap()),
            Err(MoveError::InvalidCount)
        );
        // placing on an occupied square
        assert_eq!(
            pos.try_make_move(Move::from_ptn("a2").unwrap()),
            Err(MoveError::InvalidPosition)
        );
    }

    #[test]
    /// Test that the first two plies admit only flat placements.
    fn opening_placement_rules() {
        let mut pos = Position::new();
        assert_eq!(
            pos.try_make_move(Move::from_ptn("Sa1").unwrap()),
            Err(MoveError::InvalidStone)
        );
        assert_eq!(
            pos.try_make_move(Move::from_ptn("Ca1").unwrap()),
            Err(MoveError::InvalidStone)
        );
        pos.try_make_move(Move::from_ptn("a1").unwrap()).unwrap();
    }

    #[test]
    /// Test road detection down a file, per scenario 3.
    fn black_road_win() {
        let pos = Position::from_tps(tps::BLACK_ROAD_TPS).unwrap();
        assert_eq!(pos.terminal(), GameResult::RoadWin(Color::Black));
    }

    #[test]
    /// Test that an all-flat board is a flat win for White, per scenario 4.
    fn white_flat_win() {
        let pos = Position::from_tps(tps::WHITE_FLAT_WIN_TPS).unwrap();
        assert!(pos.empty_squares().is_empty());
        assert_eq!(pos.terminal(), GameResult::FlatWin(Color::White));
    }

    #[test]
    /// Test the flat count on a wall-heavy full board, per scenario 5.
    fn flat_count_ignores_walls() {
        let pos = Position::from_tps(tps::WHITE_FLAT_COUNT_TPS).unwrap();
        assert_eq!(pos.terminal(), GameResult::FlatWin(Color::White));
    }

    #[test]
    /// Test that the wall-locked position is still ongoing, per scenario 1.
    fn wall_locked_is_ongoing() {
        let pos = Position::from_tps(tps::WALL_LOCKED_TPS).unwrap();
        assert_eq!(pos.terminal(), GameResult::Ongoing);
    }

    #[test]
    /// Test that komi can flip a level flat count.
    fn komi_decides_draws() {
        // 18 white flat tops vs 18 black flat tops
        let tps = "[TPS 1,2,1,2,1,2/2,1,2,1,2,1/1,2,1,2,1,2/2,1,2,1,2,1/1,2,1,2,1,2/2,1,2,1,2,1 1 19]";
        let mut pos = Position::from_tps(tps).unwrap();
        assert_eq!(pos.terminal(), GameResult::Draw);
        pos.set_half_komi(1);
        assert_eq!(pos.terminal(), GameResult::FlatWin(Color::Black));
    }

    #[test]
    /// Test that a wall does not complete a road but a capstone does.
    fn road_pieces() {
        let wall_gap = "[TPS 2,x5/2,x5/2,x5/2S,x5/2,x5/2,x5 1 10]";
        assert_eq!(
            Position::from_tps(wall_gap).unwrap().terminal(),
            GameResult::Ongoing
        );
        let cap_bridge = "[TPS 2,x5/2,x5/2,x5/2C,x5/2,x5/2,x5 1 10]";
        assert_eq!(
            Position::from_tps(cap_bridge).unwrap().terminal(),
            GameResult::RoadWin(Color::Black)
        );
    }

    #[test]
    /// Test road monotonicity: removing road-capable squares cannot keep a
    /// road alive, and adding them cannot destroy one.
    fn road_monotonicity() {
        let road = Position::from_tps(tps::BLACK_ROAD_TPS).unwrap();
        assert!(road.has_road(Color::Black));

        // knock out each link of the file in turn
        for missing_rank in 0..6 {
            let rows: Vec<&str> = (0..6)
                .map(|r| if r == missing_rank { "x6" } else { "2,x5" })
                .collect();
            let tps = format!("[TPS {} 2 2]", rows.join("/"));
            let broken = Position::from_tps(&tps).unwrap();
            assert!(!broken.has_road(Color::Black), "rank {missing_rank}");
        }

        // widening the road with more road-capable squares keeps it
        let widened =
            Position::from_tps("[TPS 2,2,x4/2,2,x4/2,2,x4/2,2,x4/2,2,x4/2,2,x4 2 2]").unwrap();
        assert!(widened.has_road(Color::Black));
    }

    #[test]
    /// Test that a simultaneously revealed double road goes to the player
    /// who just moved.
    fn double_road_goes_to_mover() {
        // white road on rank 1, black road on rank 6; White to move means
        // Black just moved
        let tps = "[TPS 2,2,2,2,2,2/x6/x6/x6/x6/1,1,1,1,1,1 1 10]";
        let pos = Position::from_tps(tps).unwrap();
        assert_eq!(pos.terminal(), GameResult::RoadWin(Color::Black));
        // with Black to move, the same board is White's win
        let tps = "[TPS 2,2,2,2,2,2/x6/x6/x6/x6/1,1,1,1,1,1 2 10]";
        let pos = Position::from_tps(tps).unwrap();
        assert_eq!(pos.terminal(), GameResult::RoadWin(Color::White));
    }

    #[test]
    /// Test TPS round trips across the named positions.
    fn tps_round_trips() {
        for tps in [
            tps::START_TPS,
            tps::WALL_LOCKED_TPS,
            tps::BLACK_ROAD_TPS,
            tps::WHITE_FLAT_WIN_TPS,
            tps::WHITE_FLAT_COUNT_TPS,
            tps::CRUSH_READY_TPS,
            tps::TALL_STACK_TPS,
        ] {
            let pos = Position::from_tps(tps).unwrap();
            assert_eq!(pos.to_tps(), tps, "canonical reprint of {tps}");
            let reparsed = Position::from_tps(&pos.to_tps()).unwrap();
            assert_eq!(pos, reparsed);
            assert_eq!(pos.hash(), reparsed.hash());
        }
    }

    #[test]
    /// Test that TPS parsing rejects malformed strings.
    fn tps_rejects_garbage() {
        assert!(Position::from_tps("x6/x6/x6/x6/x6 1 1").is_err());
        assert!(Position::from_tps("x6/x6/x6/x6/x6/x5 1 1").is_err());
        assert!(Position::from_tps("x6/x6/x6/x6/x6/x7 1 1").is_err());
        assert!(Position::from_tps("x6/x6/x6/x6/x6/x6 3 1").is_err());
        assert!(Position::from_tps("x6/x6/x6/x6/x6/x6 1 0").is_err());
        assert!(Position::from_tps("x6/x6/x6/x6/x6/x6 1").is_err());
        assert!(Position::from_tps("q6/x6/x6/x6/x6/x6 1 1").is_err());
        assert!(Position::from_tps("S,x5/x6/x6/x6/x6/x6 1 1").is_err());
        assert!(Position::from_tps("1S1,x5/x6/x6/x6/x6/x6 1 1").is_err());
    }

    #[test]
    /// Test that the TPS move-number and turn fields land in the ply
    /// counter.
    fn tps_ply_accounting() {
        let pos = Position::from_tps("x6/x6/x6/x6/x6/x6 1 1").unwrap();
        assert_eq!(pos.half_moves(), 0);
        let pos = Position::from_tps("1,x5/x6/x6/x6/x6/x6 2 1").unwrap();
        assert_eq!(pos.half_moves(), 1);
        let pos = Position::from_tps(tps::CRUSH_READY_TPS).unwrap();
        assert_eq!(pos.half_moves(), 4);
    }

    #[test]
    /// Test that the hash ignores stack structure deeper than the window.
    fn hash_windows_deep_stacks() {
        // ten stones: the bottom three differ, the top seven agree
        let deep_a = "[TPS x6/x6/x6/x2,1112121212,x3/x6/x6 1 20]";
        let deep_b = "[TPS x6/x6/x6/x2,2222121212,x3/x6/x6 1 20]";
        let a = Position::from_tps(deep_a).unwrap();
        let b = Position::from_tps(deep_b).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    /// Test bitboard consistency and reserve conservation along a seeded
    /// random playout, with full round-trip unwinding at the end.
    fn random_playout_round_trip() {
        let rng = fastrand::Rng::with_seed(0x5eed);
        let mut pos = Position::new();
        let mut history = Vec::new();
        let mut snapshots = vec![pos.clone()];

        for _ in 0..200 {
            if pos.terminal() != GameResult::Ongoing {
                break;
            }
            let mut moves = movegen::MoveList::new();
            movegen::legal_moves(&pos, &mut moves);
            if moves.is_empty() {
                break;
            }
            let m = moves[rng.usize(..moves.len())];
            pos.try_make_move(m).expect("generated move must be legal");
            assert!(pos.bitboards_consistent());
            assert_eq!(pos.hash(), pos.fresh_hash());
            assert_reserves_conserved(&pos);
            history.push(m);
            snapshots.push(pos.clone());
        }

        while let Some(m) = history.pop() {
            snapshots.pop();
            pos.undo_move(m);
            assert_eq!(&pos, snapshots.last().unwrap());
        }
        assert_eq!(pos, Position::new());
    }
}
