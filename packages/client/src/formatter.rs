//! Message formatting utilities for the terminal front-end.

use typefast_shared::{
    api::{LeaderboardEntryDto, RoomDto},
    scoring::TypingStats,
};

use crate::coordinator::{ChatMessage, Participant, RoomNotice, Standing};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the participant list of the current room
    ///
    /// # Arguments
    ///
    /// * `participants` - Participants from the latest presence snapshot
    /// * `my_id` - Own participant id (to mark as "me")
    pub fn format_participants(participants: &[Participant], my_id: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str("Participants:\n");

        if participants.is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for participant in participants {
                let me_suffix = if Some(participant.id.as_str()) == my_id {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{}{} - online since {}\n",
                    participant.username, me_suffix, participant.online_at
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format a chat message
    pub fn format_chat_message(message: &ChatMessage) -> String {
        format!(
            "\n\n{}\n@{}: {}\nsent at {}\n{}\n",
            THIN_RULE, message.user.name, message.content, message.created_at, THIN_RULE
        )
    }

    /// Format a toast
    pub fn format_notice(notice: &RoomNotice) -> String {
        format!("\n* {}\n", notice)
    }

    /// Format the race ranking, one line per participant
    pub fn format_standings(standings: &[Standing], my_id: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", THIN_RULE));
        if standings.is_empty() {
            output.push_str("(No racers)\n");
        }
        for (rank, standing) in standings.iter().enumerate() {
            let me_suffix = if Some(standing.participant_id.as_str()) == my_id {
                " (me)"
            } else {
                ""
            };
            let filled = usize::from(standing.progress) / 5;
            let bar = format!("{}{}", "#".repeat(filled), ".".repeat(20 - filled));
            let finish = if standing.finished_at.is_some() {
                " finished"
            } else {
                ""
            };
            output.push_str(&format!(
                "{:>2}. [{}] {:>3}% {}{}{}\n",
                rank + 1,
                bar,
                standing.progress,
                standing.username,
                me_suffix,
                finish
            ));
        }
        output.push_str(THIN_RULE);
        output.push('\n');
        output
    }

    /// Format the race text with the word to type next in brackets
    pub fn format_race_text(text: &str, word_index: usize) -> String {
        text.split_whitespace()
            .enumerate()
            .map(|(i, word)| {
                if i == word_index {
                    format!("[{}]", word)
                } else {
                    word.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format the score of a finished session
    pub fn format_stats(stats: &TypingStats) -> String {
        format!(
            "\nWPM: {}  Accuracy: {}%  Net WPM: {}\n",
            stats.wpm, stats.accuracy, stats.net_wpm
        )
    }

    /// Format a room of the directory
    pub fn format_room(room: &RoomDto) -> String {
        format!(
            "{} [{}] {:?} {} words (host: {})\n",
            room.name, room.code, room.mode, room.word_count, room.host_id
        )
    }

    /// Format the leaderboard table
    pub fn format_leaderboard(entries: &[LeaderboardEntryDto]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str("Leaderboard:\n");
        if entries.is_empty() {
            output.push_str("(No entries)\n");
        }
        for (rank, entry) in entries.iter().enumerate() {
            output.push_str(&format!(
                "{:>2}. {} - {} pts (best {} wpm, last {}% {})\n",
                rank + 1,
                entry.username,
                entry.points,
                entry.best_wpm,
                entry.last_accuracy,
                entry.difficulty
            ));
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }
}
