#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
}

const FAMILY_QUESTIONS: [Question; 3] = [
    Question {
        prompt: "Who is the youngest in our family?",
        options: ["Mom", "Dad", "Older sibling", "Me"],
        correct: 3,
    },
    Question {
        prompt: "Where would we like to go on a family trip?",
        options: ["Beach", "Mountains", "City", "Countryside"],
        correct: 0,
    },
    Question {
        prompt: "What is our family's hobby?",
        options: ["Watching movies", "Cooking", "Working out", "Reading"],
        correct: 1,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
}

/// Family quiz: one pass through the question bank, one point per correct
/// answer.
#[derive(Debug, Clone)]
pub struct QuizGame {
    questions: Vec<Question>,
    current: usize,
    score: usize,
}

impl Default for QuizGame {
    fn default() -> Self {
        Self::new(FAMILY_QUESTIONS.to_vec())
    }
}

impl QuizGame {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
        }
    }

    /// Question awaiting an answer, `None` once the quiz is over.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// 0-based position of the current question.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Answer the current question with an option index and advance.
    /// Returns `None` if the quiz is already finished.
    pub fn answer(&mut self, choice: usize) -> Option<AnswerOutcome> {
        let question = self.questions.get(self.current)?;
        let outcome = if choice == question.correct {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Wrong
        };
        self.current += 1;
        Some(outcome)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_correct_answers() {
        let mut quiz = QuizGame::default();
        assert_eq!(quiz.total(), 3);
        assert_eq!(quiz.current_question().unwrap().correct, 3);

        assert_eq!(quiz.answer(3), Some(AnswerOutcome::Correct));
        assert_eq!(quiz.answer(2), Some(AnswerOutcome::Wrong));
        assert_eq!(quiz.position(), 2);
        assert!(!quiz.is_finished());
        assert_eq!(quiz.answer(1), Some(AnswerOutcome::Correct));

        assert!(quiz.is_finished());
        assert_eq!(quiz.score(), 2);
        assert!(quiz.current_question().is_none());
    }

    #[test]
    fn answers_after_the_end_are_ignored() {
        let mut quiz = QuizGame::default();
        for _ in 0..3 {
            quiz.answer(0);
        }
        assert_eq!(quiz.answer(0), None);
        assert_eq!(quiz.score(), 1);
    }
}
