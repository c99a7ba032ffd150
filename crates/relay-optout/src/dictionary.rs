// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in opt-out vocabulary.
//!
//! Entries are lower case and matched exactly. Keywords are compared per
//! token; phrases span several words and are matched as substrings.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Single-word opt-out keywords across English, Spanish, Tagalog,
/// Vietnamese, Chinese and Korean, plus common abusive replies.
pub const KEYWORDS: &[&str] = &[
    "alisin",
    "annoying",
    "asshole",
    "assholes",
    "bitch",
    "bitches",
    "bloquear",
    "bullshit",
    "bỏ",
    "cancel",
    "cancelar",
    "cunt",
    "cunts",
    "damn",
    "detener",
    "dick",
    "dicks",
    "die",
    "duck",
    "ducking",
    "dừng",
    "eliminar",
    "end",
    "exit",
    "faggot",
    "fuck",
    "fucker",
    "fuckers",
    "fucking",
    "gfy",
    "harass",
    "harassed",
    "harassment",
    "hủy",
    "illegal",
    "itigil",
    "itigillahat",
    "jesus",
    "jfc",
    "joder",
    "kanselahin",
    "kết",
    "kys",
    "lumabas",
    "mag-exit",
    "mag-unsubscribe",
    "mierda",
    "motherfucker",
    "motherfuckers",
    "parar",
    "pendeja",
    "pendejo",
    "phuck",
    "piss",
    "pussies",
    "pussy",
    "puta",
    "puto",
    "quit",
    "remove",
    "retard",
    "retards",
    "salir",
    "shit",
    "shut",
    "sop",
    "spam",
    "spammer",
    "spamming",
    "stop",
    "stopall",
    "suck",
    "terminar",
    "thoát",
    "thúc",
    "unsolicited",
    "unsubscribe",
    "unsubscribed",
    "wakasan",
    "xóa",
    "đăng",
    "停止",
    "全部停止",
    "删除",
    "取消",
    "结束",
    "退出",
    "退订",
    "개",
    "구독취소",
    "꺼져",
    "끝",
    "나가기",
    "망할",
    "모두중지",
    "제거",
    "종료",
    "중지",
    "취소",
];

/// Multi-word opt-out phrases.
pub const PHRASES: &[&str] = &[
    "do not send",
    "go away",
    "lose my number",
    "opt out",
    "opted out",
    "take me off",
];

pub(crate) static KEYWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| KEYWORDS.iter().copied().collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_normalized() {
        for word in KEYWORDS {
            assert_eq!(*word, word.to_lowercase(), "{word}");
            assert!(!word.contains(' '), "{word}");
        }
        for phrase in PHRASES {
            assert_eq!(*phrase, phrase.to_lowercase(), "{phrase}");
            assert!(phrase.contains(' '), "{phrase}");
        }
    }

    #[test]
    fn no_duplicate_keywords() {
        assert_eq!(KEYWORD_SET.len(), KEYWORDS.len());
    }
}
