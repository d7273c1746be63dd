//! NNUE evaluation oracle. The network is an opaque weight blob loaded once
//! from disk: 768 piece-square inputs feed a single clipped-ReLU hidden
//! layer per perspective, concatenated into one linear output neuron.
//!
//! When no network is loaded (or the file is malformed) `evaluate` returns
//! `None` and the engine falls back to the classical evaluation; a missing
//! network is never a fatal error.

use crate::bitboard::*;
use crate::board::Board;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{OnceLock, RwLock};

/// File header magic, little-endian "KGNN".
const MAGIC: u32 = 0x4E4E_474B;
const VERSION: u32 = 1;

const INPUT_SIZE: usize = 768; // 2 colors x 6 pieces x 64 squares
const HIDDEN_SIZE: usize = 128;

/// Quantization: inputs scaled by 255, output weights by 64.
const QA: i32 = 255;
const QB: i32 = 64;
const SCALE: i32 = 400;

struct Network {
    /// input -> hidden, laid out [feature][neuron]
    ft_weights: Vec<i16>,
    ft_bias: Vec<i16>,
    /// hidden (both perspectives) -> output
    out_weights: Vec<i16>,
    out_bias: i32,
}

static NETWORK: OnceLock<RwLock<Option<Network>>> = OnceLock::new();

fn slot() -> &'static RwLock<Option<Network>> {
    NETWORK.get_or_init(|| RwLock::new(None))
}

/// Try to load a network; `None` clears the loaded one. Failure leaves the
/// previous network in place and is reported on the UCI info channel by the
/// caller.
pub fn load(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        *slot().write().unwrap() = None;
        return Ok(());
    };
    let network = read_network(path)?;
    *slot().write().unwrap() = Some(network);
    Ok(())
}

pub fn is_active() -> bool {
    slot().read().unwrap().is_some()
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i16s(reader: &mut impl Read, count: usize) -> io::Result<Vec<i16>> {
    let mut bytes = vec![0u8; count * 2];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

fn read_network(path: &Path) -> io::Result<Network> {
    let mut file = File::open(path)?;

    if read_u32(&mut file)? != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad network magic"));
    }
    if read_u32(&mut file)? != VERSION {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported network version"));
    }
    if read_u32(&mut file)? as usize != HIDDEN_SIZE {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "unexpected hidden size"));
    }

    let ft_weights = read_i16s(&mut file, INPUT_SIZE * HIDDEN_SIZE)?;
    let ft_bias = read_i16s(&mut file, HIDDEN_SIZE)?;
    let out_weights = read_i16s(&mut file, 2 * HIDDEN_SIZE)?;
    let out_bias = read_u32(&mut file)? as i32;

    Ok(Network {
        ft_weights,
        ft_bias,
        out_weights,
        out_bias,
    })
}

/// Feature index of (piece, color, square) from `perspective`'s view.
#[inline]
fn feature_index(perspective: Color, color: Color, piece: Piece, sq: u8) -> usize {
    let (rel_color, rel_sq) = match perspective {
        Color::White => (color.index(), sq as usize),
        Color::Black => (color.flip().index(), (sq ^ 56) as usize),
    };
    rel_color * (PIECE_COUNT * 64) + piece.index() * 64 + rel_sq
}

/// Network score in centipawns from the side to move, or `None` when no
/// network is loaded.
pub fn evaluate(board: &Board) -> Option<i32> {
    let guard = slot().read().unwrap();
    let net = guard.as_ref()?;

    let mut acc = [[0i32; HIDDEN_SIZE]; 2];
    for perspective in [Color::White, Color::Black] {
        let a = &mut acc[perspective.index()];
        for (neuron, bias) in a.iter_mut().zip(net.ft_bias.iter()) {
            *neuron = *bias as i32;
        }
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in Bits(board.pieces[color.index()][piece.index()]) {
                    let base = feature_index(perspective, color, piece, sq) * HIDDEN_SIZE;
                    for (neuron, w) in a.iter_mut().zip(&net.ft_weights[base..base + HIDDEN_SIZE]) {
                        *neuron += *w as i32;
                    }
                }
            }
        }
    }

    let (stm, ntm) = match board.side {
        Color::White => (&acc[0], &acc[1]),
        Color::Black => (&acc[1], &acc[0]),
    };

    let mut output = net.out_bias;
    for (i, &v) in stm.iter().enumerate() {
        output += v.clamp(0, QA) * net.out_weights[i] as i32;
    }
    for (i, &v) in ntm.iter().enumerate() {
        output += v.clamp(0, QA) * net.out_weights[HIDDEN_SIZE + i] as i32;
    }

    Some(output * SCALE / (QA * QB))
}
