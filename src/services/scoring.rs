use crate::models::domain::TestQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptScore {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
}

/// Rounded percentage of `score` over `total`; zero when there is nothing to score.
pub fn percentage(score: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    (score as f64 / total as f64 * 100.0).round() as i32
}

/// Scores answers position by position against `questions`, which must be in
/// presentation order. Unanswered, missing and out-of-range answers count as wrong.
/// Answers beyond the last question are ignored.
pub fn score_attempt(
    questions: &[TestQuestion],
    answers: &[Option<i32>],
    passing_score: i32,
) -> AttemptScore {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, question)| {
            answers
                .get(*i)
                .copied()
                .flatten()
                .is_some_and(|answer| answer == question.correct_answer)
        })
        .count() as i32;

    let total_questions = questions.len() as i32;
    let percentage = percentage(score, total_questions);

    AttemptScore {
        score,
        total_questions,
        percentage,
        passed: percentage >= passing_score,
    }
}
