//! Parser for the ISE XML scoring document.
//!
//! The engine returns a nested tree — reading-type block, `rec_paper`,
//! sentence, word, syllable, phone — with every number stored as a string
//! attribute. Some attributes arrive blank and the occasional one arrives
//! garbled; a bad number must never fail the whole document, it just reads
//! as zero.

use roxmltree::{Document, Node};

use crate::core::assess::base::{
    AssessError, AssessmentResult, Category, PhonemeScore, TimeSpan, WordScore,
};

/// Positions in the document are counted in 10ms frames.
const FRAME_MS: u32 = 10;

/// Parse the scoring document for the requested reading category.
pub fn parse_report(xml: &str, category: Category) -> Result<AssessmentResult, AssessError> {
    let doc = Document::parse(xml)
        .map_err(|e| AssessError::MalformedReport(format!("invalid xml: {e}")))?;
    let tag = category.wire_name();

    // The scored block shares its tag name with an outer wrapper element;
    // the score attributes are what distinguish it.
    let scored = doc
        .root()
        .descendants()
        .find(|n| n.has_tag_name(tag) && n.attribute("total_score").is_some())
        .ok_or_else(|| {
            AssessError::MalformedReport(format!("no scored {tag} block in report"))
        })?;

    let mut result = AssessmentResult {
        total_score: lenient_f32(scored, "total_score"),
        accuracy: lenient_f32(scored, "accuracy_score"),
        fluency: lenient_f32(scored, "fluency_score"),
        completeness: lenient_f32(scored, "integrity_score"),
        intonation: lenient_f32(scored, "standard_score"),
        words: Vec::new(),
    };

    for word in scored.descendants().filter(|n| n.has_tag_name("word")) {
        let content = word.attribute("content").unwrap_or("").trim();
        if is_noise(content) {
            continue;
        }

        let mut phonemes = Vec::new();
        for phone in word.descendants().filter(|n| n.has_tag_name("phone")) {
            let phoneme = phone.attribute("content").unwrap_or("").trim();
            if is_noise(phoneme) {
                continue;
            }
            phonemes.push(PhonemeScore {
                phoneme: phoneme.to_string(),
                score: phone_score(phone),
                span: span_of(phone),
            });
        }

        result.words.push(WordScore {
            word: content.to_string(),
            score: lenient_f32(word, "total_score"),
            span: span_of(word),
            phonemes,
        });
    }

    Ok(result)
}

/// Silence and filler markers the engine inserts between real segments.
fn is_noise(content: &str) -> bool {
    matches!(content, "" | "sil" | "silv" | "fil" | "noise")
}

/// Per-phone score: an explicit score when present, otherwise derived from
/// the engine's match flag (`dp_message` 0 means pronounced as expected).
fn phone_score(phone: Node<'_, '_>) -> f32 {
    if phone.attribute("total_score").is_some() {
        lenient_f32(phone, "total_score")
    } else if lenient_u32(phone, "dp_message") == 0 {
        100.0
    } else {
        0.0
    }
}

fn span_of(node: Node<'_, '_>) -> TimeSpan {
    TimeSpan {
        begin_ms: lenient_u32(node, "beg_pos") * FRAME_MS,
        end_ms: lenient_u32(node, "end_pos") * FRAME_MS,
    }
}

fn lenient_f32(node: Node<'_, '_>, name: &str) -> f32 {
    node.attribute(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

fn lenient_u32(node: Node<'_, '_>, name: &str) -> u32 {
    node.attribute(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE_REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xml_result>
  <read_sentence lan="en" type="study">
    <rec_paper>
      <read_sentence accuracy_score="85" fluency_score="78" integrity_score="90"
                     standard_score="88" total_score="84" content="The cat sat on the mat">
        <sentence beg_pos="0" end_pos="260" content="The cat sat on the mat">
          <word beg_pos="0" end_pos="30" content="the" total_score="92">
            <syll beg_pos="0" end_pos="30" content="the">
              <phone beg_pos="0" end_pos="15" content="dh" dp_message="0"/>
              <phone beg_pos="15" end_pos="30" content="ax" dp_message="0"/>
            </syll>
          </word>
          <word beg_pos="30" end_pos="40" content="sil">
            <syll beg_pos="30" end_pos="40" content="sil">
              <phone beg_pos="30" end_pos="40" content="sil" dp_message="0"/>
            </syll>
          </word>
          <word beg_pos="40" end_pos="80" content="cat" total_score="81">
            <syll beg_pos="40" end_pos="80" content="cat">
              <phone beg_pos="40" end_pos="55" content="k" dp_message="0"/>
              <phone beg_pos="55" end_pos="70" content="ae" dp_message="16"/>
              <phone beg_pos="70" end_pos="80" content="t" dp_message="0"/>
            </syll>
          </word>
          <word beg_pos="80" end_pos="120" content="sat" total_score="79"/>
          <word beg_pos="120" end_pos="150" content="on" total_score="88"/>
          <word beg_pos="150" end_pos="180" content="the" total_score="90"/>
          <word beg_pos="180" end_pos="240" content="mat" total_score="76"/>
        </sentence>
      </read_sentence>
    </rec_paper>
  </read_sentence>
</xml_result>"#;

    #[test]
    fn test_sentence_report_scores_and_order() {
        let result = parse_report(SENTENCE_REPORT, Category::Sentence).unwrap();

        assert_eq!(result.total_score, 84.0);
        assert_eq!(result.accuracy, 85.0);
        assert_eq!(result.fluency, 78.0);
        assert_eq!(result.completeness, 90.0);
        assert_eq!(result.intonation, 88.0);

        // Six words in spoken order; the silence entry is excluded.
        let words: Vec<&str> = result.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["the", "cat", "sat", "on", "the", "mat"]);
        assert_eq!(result.words[1].score, 81.0);
        assert_eq!(result.words[1].span, TimeSpan { begin_ms: 400, end_ms: 800 });
    }

    #[test]
    fn test_phoneme_lists_exclude_silence() {
        let result = parse_report(SENTENCE_REPORT, Category::Sentence).unwrap();

        let the = &result.words[0];
        let phonemes: Vec<&str> = the.phonemes.iter().map(|p| p.phoneme.as_str()).collect();
        assert_eq!(phonemes, vec!["dh", "ax"]);
        assert_eq!(the.phonemes[0].span, TimeSpan { begin_ms: 0, end_ms: 150 });
        assert_eq!(the.phonemes[0].score, 100.0);

        // A mispronounced phone scores zero via the match flag.
        let cat = &result.words[1];
        assert_eq!(cat.phonemes.len(), 3);
        assert_eq!(cat.phonemes[1].phoneme, "ae");
        assert_eq!(cat.phonemes[1].score, 0.0);
    }

    #[test]
    fn test_lenient_numeric_parsing() {
        let xml = r#"<xml_result><read_word>
            <rec_paper><read_word accuracy_score="" fluency_score="garbage"
                                  integrity_score="70.5" total_score="66">
                <word beg_pos="oops" end_pos="12" content="cat" total_score=""/>
            </read_word></rec_paper>
        </read_word></xml_result>"#;

        let result = parse_report(xml, Category::Word).unwrap();
        assert_eq!(result.accuracy, 0.0); // blank
        assert_eq!(result.fluency, 0.0); // unparsable
        assert_eq!(result.completeness, 70.5);
        assert_eq!(result.intonation, 0.0); // absent
        assert_eq!(result.total_score, 66.0);

        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].score, 0.0);
        assert_eq!(result.words[0].span, TimeSpan { begin_ms: 0, end_ms: 120 });
    }

    #[test]
    fn test_missing_category_block_is_an_error() {
        let result = parse_report(SENTENCE_REPORT, Category::Word);
        assert!(matches!(result, Err(AssessError::MalformedReport(_))));
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        let result = parse_report("this is not xml <", Category::Sentence);
        assert!(matches!(result, Err(AssessError::MalformedReport(_))));
    }

    #[test]
    fn test_word_count_scales_with_document() {
        // N words with M phones each survive with order intact.
        let n = 12;
        let m = 3;
        let mut words = String::new();
        for i in 0..n {
            let mut phones = String::new();
            for j in 0..m {
                phones.push_str(&format!(
                    r#"<phone beg_pos="{0}" end_pos="{1}" content="p{i}_{j}" dp_message="0"/>"#,
                    i * 10 + j,
                    i * 10 + j + 1
                ));
            }
            words.push_str(&format!(
                r#"<word beg_pos="{0}" end_pos="{1}" content="w{i}" total_score="50">{phones}</word>"#,
                i * 10,
                i * 10 + m
            ));
        }
        let xml = format!(
            r#"<xml_result><read_chapter><rec_paper>
                <read_chapter total_score="75"><sentence>{words}</sentence></read_chapter>
            </rec_paper></read_chapter></xml_result>"#
        );

        let result = parse_report(&xml, Category::Passage).unwrap();
        assert_eq!(result.words.len(), n);
        for (i, word) in result.words.iter().enumerate() {
            assert_eq!(word.word, format!("w{i}"));
            assert_eq!(word.phonemes.len(), m);
        }
    }
}
