//! Magic bitboard tables for sliding piece attack generation.
//!
//! For every square a relevance mask selects the blockers that can change a
//! slider's attack set. Multiplying the masked occupancy by a per-square magic
//! constant and shifting right yields a dense index into a table filled with
//! ray-traced attack sets. The constants were found offline by trial and
//! check; the tables are built once, on first use, and verified exhaustively
//! against ray tracing before being published.

use crate::Bitboard;
use chess_core::Square;
use std::sync::OnceLock;

/// Lookup parameters for a single square.
#[derive(Debug, Clone, Copy)]
struct Magic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occupied: u64) -> usize {
        self.offset + ((occupied & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// One slider family: per-square parameters plus the shared attack table.
struct SliderTable {
    magics: [Magic; 64],
    attacks: Vec<Bitboard>,
}

/// Bishop and rook tables.
struct AttackTables {
    bishop: SliderTable,
    rook: SliderTable,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

fn tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(|| {
        let tables = AttackTables {
            bishop: SliderTable::build(&BISHOP_MAGICS, &BISHOP_DIRECTIONS),
            rook: SliderTable::build(&ROOK_MAGICS, &ROOK_DIRECTIONS),
        };
        tracing::debug!(
            bishop_entries = tables.bishop.attacks.len(),
            rook_entries = tables.rook.attacks.len(),
            "magic attack tables built"
        );
        tables
    })
}

/// Forces table construction (and its self-check) now rather than on the
/// first attack query.
pub fn init() {
    tables();
}

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240, 0x2004844802002010, 0x2068080051921000, 0x62880a0220200808,
    0x0004042004000000, 0x0100822020200011, 0xc00444222012000a, 0x0028808801216001,
    0x0400492088408100, 0x0201c401040c0084, 0x00840800910a0010, 0x0000082080240060,
    0x2000840504006000, 0x30010c4108405004, 0x1008005410080802, 0x8144042209100900,
    0x0208081020014400, 0x004800201208ca00, 0x0f18140408012008, 0x1004002802102001,
    0x0841000820080811, 0x0040200200a42008, 0x0000800054042000, 0x88010400410c9000,
    0x0520040470104290, 0x1004040051500081, 0x2002081833080021, 0x000400c00c010142,
    0x941408200c002000, 0x0658810000806011, 0x0188071040440a00, 0x4800404002011c00,
    0x0104442040404200, 0x0005301000020420, 0x0004022401120400, 0x80c0040400080120,
    0x8040010040820802, 0x0480810700020090, 0x0102008e00040242, 0x0809005202050100,
    0x8002024220104080, 0x0431008804142000, 0x0019001802081400, 0x0200014208040080,
    0x3308082008200100, 0x041010500040c020, 0x4012020c04210308, 0x208220a202004080,
    0x0111040120082000, 0x6803040141280a00, 0x2101004202410000, 0x8200000041108022,
    0x0000021082088000, 0x0002410204010040, 0x0040100400809000, 0x0822088220820214,
    0x0040808090012004, 0x00910224040218c9, 0x0402814422015008, 0x0090014004842410,
    0x0001000042304105, 0x0010008830412a00, 0x2520081090008908, 0x40102000a0a60140,
];

const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020, 0x06c00049b0002001, 0x0100200010090040, 0x2480041000800801,
    0x0280028004000800, 0x0900410008040022, 0x0280020001001080, 0x2880002041000080,
    0xa000800080400034, 0x0004808020004000, 0x2290802004801000, 0x0411000d00100020,
    0x0402800800040080, 0x000b000401004208, 0x2409000100040200, 0x0001002100004082,
    0x0022878001e24000, 0x1090810021004010, 0x0801030040200012, 0x0500808008001000,
    0x0a08018014000880, 0x8000808004000200, 0x0201008080010200, 0x0801020000441091,
    0x0000800080204005, 0x1040200040100048, 0x0000120200402082, 0x0d14880480100080,
    0x0012040280080080, 0x0100040080020080, 0x9020010080800200, 0x0813241200148449,
    0x0491604001800080, 0x0100401000402001, 0x4820010021001040, 0x0400402202000812,
    0x0209009005000802, 0x0810800601800400, 0x4301083214000150, 0x204026458e001401,
    0x0040204000808000, 0x8001008040010020, 0x8410820820420010, 0x1003001000090020,
    0x0804040008008080, 0x0012000810020004, 0x1000100200040208, 0x430000a044020001,
    0x0280009023410300, 0x00e0100040002240, 0x0000200100401700, 0x2244100408008080,
    0x0008000400801980, 0x0002000810040200, 0x8010100228810400, 0x2000009044210200,
    0x4080008040102101, 0x0040002080411d01, 0x2005524060000901, 0x0502001008400422,
    0x489a000810200402, 0x0001004400080a13, 0x4000011008020084, 0x0026002114058042,
];

impl SliderTable {
    fn build(magics: &[u64; 64], directions: &[(i8, i8); 4]) -> Self {
        let mut attacks = Vec::new();
        let mut params = [Magic {
            mask: 0,
            magic: 0,
            shift: 0,
            offset: 0,
        }; 64];

        for sq in Square::all() {
            let mask = relevance_mask(sq, directions);
            let bits = mask.count_ones();
            let magic = Magic {
                mask,
                magic: magics[sq.idx()],
                shift: 64 - bits,
                offset: attacks.len(),
            };
            attacks.resize(magic.offset + (1usize << bits), Bitboard::EMPTY);

            for_each_subset(mask, |blockers| {
                attacks[magic.index(blockers)] = trace_attacks(sq, blockers, directions);
            });
            params[sq.idx()] = magic;
        }

        let table = SliderTable {
            magics: params,
            attacks,
        };
        table.verify(directions);
        table
    }

    /// Panics if any occupancy subset maps to an attack set that differs from
    /// ray tracing, i.e. if a magic constant has a destructive collision.
    fn verify(&self, directions: &[(i8, i8); 4]) {
        for sq in Square::all() {
            let magic = &self.magics[sq.idx()];
            for_each_subset(magic.mask, |blockers| {
                let expected = trace_attacks(sq, blockers, directions);
                assert_eq!(
                    self.attacks[magic.index(blockers)],
                    expected,
                    "magic collision on {} for blockers {:#018x}",
                    sq,
                    blockers
                );
            });
        }
    }

    #[inline]
    fn lookup(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.attacks[self.magics[sq.idx()].index(occupied.0)]
    }
}

/// Visits every subset of `mask` (Carry-Rippler enumeration), empty set first.
fn for_each_subset(mask: u64, mut visit: impl FnMut(u64)) {
    let mut subset = 0u64;
    loop {
        visit(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
}

/// Squares a slider could be blocked on, excluding the last square of each
/// ray (a blocker there changes nothing).
fn relevance_mask(sq: Square, directions: &[(i8, i8); 4]) -> u64 {
    let mut mask = 0u64;
    for &(dr, df) in directions {
        let mut rank = sq.rank() as i8 + dr;
        let mut file = sq.file() as i8 + df;
        while let (Some(here), Some(_)) = (
            Square::from_coords(file, rank),
            Square::from_coords(file + df, rank + dr),
        ) {
            mask |= here.bit();
            rank += dr;
            file += df;
        }
    }
    mask
}

/// Walks each ray outward until and including the first blocker.
fn trace_attacks(sq: Square, blockers: u64, directions: &[(i8, i8); 4]) -> Bitboard {
    let mut attacks = 0u64;
    for &(dr, df) in directions {
        let mut rank = sq.rank() as i8 + dr;
        let mut file = sq.file() as i8 + df;
        while let Some(target) = Square::from_coords(file, rank) {
            attacks |= target.bit();
            if blockers & target.bit() != 0 {
                break;
            }
            rank += dr;
            file += df;
        }
    }
    Bitboard(attacks)
}

/// Bishop attacks from `sq` given the full board occupancy.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().bishop.lookup(sq, occupied)
}

/// Rook attacks from `sq` given the full board occupancy.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().rook.lookup(sq, occupied)
}

/// Queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Bishop attacks computed by walking rays; the reference the tables are
/// checked against.
pub fn bishop_attacks_traced(sq: Square, occupied: Bitboard) -> Bitboard {
    trace_attacks(sq, occupied.0, &BISHOP_DIRECTIONS)
}

/// Rook attacks computed by walking rays.
pub fn rook_attacks_traced(sq: Square, occupied: Bitboard) -> Bitboard {
    trace_attacks(sq, occupied.0, &ROOK_DIRECTIONS)
}
