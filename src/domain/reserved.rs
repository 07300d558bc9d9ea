// ============================================================
// Layer 3 - Reserved Tokens
// ============================================================
// Four control tokens sit at the front of every vocabulary:
//
//   id 0  <PAD>  padding for batching
//   id 1  <UNK>  anything not in the vocabulary
//   id 2  <EOS>  end of sequence
//   id 3  <GO>   start-of-sequence marker for generation
//
// The ids are fixed regardless of corpus content, so the
// training process can hard-code them.

use super::dictionary::TokenId;

pub const MARK_PAD: &str = "<PAD>";
pub const MARK_UNK: &str = "<UNK>";
pub const MARK_EOS: &str = "<EOS>";
pub const MARK_GO: &str = "<GO>";

pub const ID_PAD: TokenId = 0;
pub const ID_UNK: TokenId = 1;
pub const ID_EOS: TokenId = 2;
pub const ID_GO: TokenId = 3;

/// All reserved tokens in id order
pub const MARKS: [&str; 4] = [MARK_PAD, MARK_UNK, MARK_EOS, MARK_GO];

/// Returns true if `token` is exactly one of the reserved tokens.
/// Matching is case-sensitive: `<pad>` is an ordinary corpus word.
pub fn is_reserved(token: &str) -> bool {
    MARKS.contains(&token)
}
