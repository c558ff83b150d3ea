use indexmap::IndexMap;
use std::sync::LazyLock;

use crate::language::transformer::{
    suffix_inflection, Condition, LanguageTransformDescriptor, Rule, Transform,
};

const IKU_VERBS: [&str; 4] = ["いく", "行く", "逝く", "往く"];
#[rustfmt::skip]
const GODAN_U_SPECIAL_VERBS: [&str; 12] = [
    "こう", "とう", "請う", "乞う", "恋う", "問う", "訪う",
    "宣う", "曰う", "給う", "賜う", "揺蕩う",
];
const FU_VERB_TE_CONJUGATIONS: [[&str; 2]; 3] = [
    ["のたまう", "のたもう"],
    ["たまう", "たもう"],
    ["たゆたう", "たゆとう"],
];

/// Godan dictionary endings paired with their continuative (連用形) kana.
#[rustfmt::skip]
const GODAN_CONTINUATIVE: [(&str, &str); 9] = [
    ("い", "う"), ("き", "く"), ("ぎ", "ぐ"), ("し", "す"), ("ち", "つ"),
    ("に", "ぬ"), ("び", "ぶ"), ("み", "む"), ("り", "る"),
];

/// Godan dictionary endings paired with their irrealis (未然形) kana.
#[rustfmt::skip]
const GODAN_IRREALIS: [(&str, &str); 9] = [
    ("か", "く"), ("が", "ぐ"), ("さ", "す"), ("た", "つ"), ("な", "ぬ"),
    ("ば", "ぶ"), ("ま", "む"), ("ら", "る"), ("わ", "う"),
];

/// Godan dictionary endings paired with their hypothetical (仮定形) kana.
#[rustfmt::skip]
const GODAN_HYPOTHETICAL: [(&str, &str); 9] = [
    ("え", "う"), ("け", "く"), ("げ", "ぐ"), ("せ", "す"), ("て", "つ"),
    ("ね", "ぬ"), ("べ", "ぶ"), ("め", "む"), ("れ", "る"),
];

/// Godan dictionary endings paired with their volitional kana.
#[rustfmt::skip]
const GODAN_VOLITIONAL: [(&str, &str); 9] = [
    ("お", "う"), ("こ", "く"), ("ご", "ぐ"), ("そ", "す"), ("と", "つ"),
    ("の", "ぬ"), ("ぼ", "ぶ"), ("も", "む"), ("ろ", "る"),
];

/// `(stem, dictionary form, condition)` for する, ずる and くる, keyed by the
/// stem each of them takes before a given suffix.
struct IrregularStems {
    vz: &'static str,
    vs: &'static str,
    vk: &'static str,
}

const CONTINUATIVE_IRREGULARS: IrregularStems = IrregularStems {
    vz: "じ",
    vs: "し",
    vk: "き",
};

const IRREALIS_IRREGULARS: IrregularStems = IrregularStems {
    vz: "ぜ",
    vs: "せ",
    vk: "こ",
};

fn irregular_rules(
    stems: &IrregularStems,
    suffix: &str,
    conditions_in: &[&str],
) -> Vec<Rule> {
    vec![
        suffix_inflection(&format!("{}{suffix}", stems.vz), "ずる", conditions_in, &["vz"]),
        suffix_inflection(&format!("{}{suffix}", stems.vs), "する", conditions_in, &["vs"]),
        suffix_inflection(&format!("為{suffix}"), "為る", conditions_in, &["vs"]),
        suffix_inflection(&format!("{}{suffix}", stems.vk), "くる", conditions_in, &["vk"]),
        suffix_inflection(&format!("来{suffix}"), "来る", conditions_in, &["vk"]),
        suffix_inflection(&format!("來{suffix}"), "來る", conditions_in, &["vk"]),
    ]
}

fn godan_rules(
    table: &[(&str, &str)],
    suffix: &str,
    conditions_in: &[&str],
    conditions_out: &[&str],
) -> Vec<Rule> {
    table
        .iter()
        .map(|(stem, ending)| {
            suffix_inflection(&format!("{stem}{suffix}"), ending, conditions_in, conditions_out)
        })
        .collect()
}

/// Suffixes attached to the continuative stem: 食べ-, 書き-, し-, 来-.
fn continuative_rules(suffix: &str, conditions_in: &[&str]) -> Vec<Rule> {
    let mut rules = vec![suffix_inflection(suffix, "る", conditions_in, &["v1"])];
    rules.extend(godan_rules(&GODAN_CONTINUATIVE, suffix, conditions_in, &["v5"]));
    rules.extend(irregular_rules(&CONTINUATIVE_IRREGULARS, suffix, conditions_in));
    rules
}

/// Suffixes attached to the irrealis stem: 食べ-, 書か-, せ-, こ-.
fn irrealis_rules(suffix: &str, conditions_in: &[&str]) -> Vec<Rule> {
    let mut rules = vec![suffix_inflection(suffix, "る", conditions_in, &["v1"])];
    rules.extend(godan_rules(&GODAN_IRREALIS, suffix, conditions_in, &["v5"]));
    rules.extend(irregular_rules(&IRREALIS_IRREGULARS, suffix, conditions_in));
    rules
}

/// The euphonic past/-te family. `plain` is the unvoiced suffix (て, た, たら, たり)
/// and `voiced` its voiced twin (で, だ, だら, だり).
fn euphonic_rules(plain: &str, voiced: &str, conditions_in: &[&str]) -> Vec<Rule> {
    let v5 = &["v5"][..];
    let mut rules = vec![
        suffix_inflection(plain, "る", conditions_in, &["v1"]),
        suffix_inflection(&format!("い{plain}"), "く", conditions_in, v5),
        suffix_inflection(&format!("い{voiced}"), "ぐ", conditions_in, v5),
        suffix_inflection(&format!("し{plain}"), "す", conditions_in, v5),
        suffix_inflection(&format!("っ{plain}"), "う", conditions_in, v5),
        suffix_inflection(&format!("っ{plain}"), "つ", conditions_in, v5),
        suffix_inflection(&format!("っ{plain}"), "る", conditions_in, v5),
        suffix_inflection(&format!("ん{voiced}"), "ぬ", conditions_in, v5),
        suffix_inflection(&format!("ん{voiced}"), "ぶ", conditions_in, v5),
        suffix_inflection(&format!("ん{voiced}"), "む", conditions_in, v5),
    ];
    rules.extend(irregular_rules(&CONTINUATIVE_IRREGULARS, plain, conditions_in));
    rules.extend(irregular_verb_rules(plain, conditions_in));
    rules
}

/// 行く and the う-verbs whose euphonic stem is irregular.
fn irregular_verb_rules(suffix: &str, conditions_in: &[&str]) -> Vec<Rule> {
    let v5 = &["v5"][..];
    let iku = IKU_VERBS.iter().filter_map(|verb| {
        let first = verb.chars().next()?;
        Some(suffix_inflection(&format!("{first}っ{suffix}"), verb, conditions_in, v5))
    });
    let godan = GODAN_U_SPECIAL_VERBS
        .iter()
        .map(|verb| suffix_inflection(&format!("{verb}{suffix}"), verb, conditions_in, v5));
    let fu = FU_VERB_TE_CONJUGATIONS.iter().map(|[verb, te_root]| {
        suffix_inflection(&format!("{te_root}{suffix}"), verb, conditions_in, v5)
    });
    iku.chain(godan).chain(fu).collect()
}

/// ちゃ/ちゃう/ちまう contractions of the -te form.
fn contracted_te_rules(plain: &str, voiced: &str) -> Vec<Rule> {
    let v5 = &["v5"][..];
    let mut rules = vec![
        suffix_inflection(plain, "る", v5, &["v1"]),
        suffix_inflection(&format!("い{voiced}"), "ぐ", v5, v5),
        suffix_inflection(&format!("い{plain}"), "く", v5, v5),
        suffix_inflection(&format!("し{plain}"), "す", v5, v5),
        suffix_inflection(&format!("っ{plain}"), "う", v5, v5),
        suffix_inflection(&format!("っ{plain}"), "く", v5, v5),
        suffix_inflection(&format!("っ{plain}"), "つ", v5, v5),
        suffix_inflection(&format!("っ{plain}"), "る", v5, v5),
        suffix_inflection(&format!("ん{voiced}"), "ぬ", v5, v5),
        suffix_inflection(&format!("ん{voiced}"), "ぶ", v5, v5),
        suffix_inflection(&format!("ん{voiced}"), "む", v5, v5),
    ];
    rules.extend(irregular_rules(&CONTINUATIVE_IRREGULARS, plain, v5));
    rules
}

fn transform(name: &str, description: Option<&str>, rules: Vec<Rule>) -> (String, Transform) {
    (
        name.to_string(),
        Transform {
            name: name.to_string(),
            description: description.map(str::to_string),
            rules,
        },
    )
}

fn with_leading(mut leading: Vec<Rule>, rules: Vec<Rule>) -> Vec<Rule> {
    leading.extend(rules);
    leading
}

fn conditions() -> IndexMap<String, Condition> {
    let entries = [
        ("v", Condition::new("Verb", false).with_sub_conditions(&["v1", "v5", "vk", "vs", "vz"])),
        ("v1", Condition::new("Ichidan verb", true).with_sub_conditions(&["v1d", "v1p"])),
        ("v1d", Condition::new("Ichidan verb, dictionary form", false)),
        ("v1p", Condition::new("Ichidan verb, progressive or perfect form", false)),
        ("v5", Condition::new("Godan verb", true).with_sub_conditions(&["v5d", "v5s"])),
        ("v5d", Condition::new("Godan verb, dictionary form", false)),
        ("v5s", Condition::new("Godan verb, short causative form", false).with_sub_conditions(&["v5ss", "v5sp"])),
        ("v5ss", Condition::new("Godan verb, short causative form having さす ending (cannot conjugate with passive form)", false)),
        ("v5sp", Condition::new("Godan verb, short causative form not having さす ending (can conjugate with passive form)", false)),
        ("vk", Condition::new("Kuru verb", true)),
        ("vs", Condition::new("Suru verb", true)),
        ("vz", Condition::new("Zuru verb", true)),
        ("adj-i", Condition::new("Adjective with i ending", true)),
        ("-ます", Condition::new("Polite -ます ending", false)),
        ("-ません", Condition::new("Polite negative -ません ending", false)),
        ("-て", Condition::new("Intermediate -て endings for progressive or perfect tense", false)),
        ("-ば", Condition::new("Intermediate -ば endings for conditional contraction", false)),
        ("-く", Condition::new("Intermediate -く endings for adverbs", false)),
        ("-た", Condition::new("-た form ending", false)),
        ("-ん", Condition::new("-ん negative ending", false)),
        ("-なさい", Condition::new("Intermediate -なさい ending (polite imperative)", false)),
        ("-ゃ", Condition::new("Intermediate -や ending (conditional contraction)", false)),
    ];
    entries
        .into_iter()
        .map(|(id, condition)| (id.to_string(), condition))
        .collect()
}

#[rustfmt::skip]
fn transforms() -> IndexMap<String, Transform> {
    let s = suffix_inflection;
    let v1 = &["v1"][..];
    let v5 = &["v5"][..];
    let adj_i = &["adj-i"][..];
    let none: &[&str] = &[];

    let mut ba = vec![s("ければ", "い", &["-ば"], adj_i)];
    ba.extend(godan_rules(&GODAN_HYPOTHETICAL[..8], "ば", &["-ば"], v5));
    ba.push(s("れば", "る", &["-ば"], &["v1", "v5", "vk", "vs", "vz"]));
    ba.push(s("れば", "", &["-ば"], &["-ます"]));

    let mut imperative = vec![s("ろ", "る", none, v1), s("よ", "る", none, v1)];
    imperative.extend(godan_rules(&GODAN_HYPOTHETICAL, "", none, v5));
    imperative.extend([
        s("じろ", "ずる", none, &["vz"]),
        s("ぜよ", "ずる", none, &["vz"]),
        s("しろ", "する", none, &["vs"]),
        s("せよ", "する", none, &["vs"]),
        s("為ろ", "為る", none, &["vs"]),
        s("為よ", "為る", none, &["vs"]),
        s("こい", "くる", none, &["vk"]),
        s("来い", "来る", none, &["vk"]),
        s("來い", "來る", none, &["vk"]),
    ]);

    let mut continuative: Vec<Rule> = "いえきぎけげじせぜちてでにねひびへべみめりれ"
        .chars()
        .map(|kana| s(&kana.to_string(), &format!("{kana}る"), none, &["v1d"]))
        .collect();
    continuative.extend(godan_rules(&GODAN_CONTINUATIVE, "", none, v5));
    continuative.extend([
        s("き", "くる", none, &["vk"]),
        s("し", "する", none, &["vs"]),
        s("来", "来る", none, &["vk"]),
        s("來", "來る", none, &["vk"]),
    ]);

    let mut negative = vec![s("くない", "い", adj_i, adj_i), s("ない", "る", adj_i, v1)];
    negative.extend(godan_rules(&GODAN_IRREALIS, "ない", adj_i, v5));
    negative.extend(irregular_rules(&IrregularStems { vz: "じ", vs: "し", vk: "こ" }, "ない", adj_i));
    negative.push(s("ません", "ます", &["-ません"], &["-ます"]));

    let mut causative = vec![s("させる", "る", v1, v1)];
    causative.extend(godan_rules(&GODAN_IRREALIS, "せる", v1, v5));
    causative.extend([
        s("じさせる", "ずる", v1, &["vz"]),
        s("ぜさせる", "ずる", v1, &["vz"]),
        s("させる", "する", v1, &["vs"]),
        s("為せる", "為る", v1, &["vs"]),
        s("せさせる", "する", v1, &["vs"]),
        s("為させる", "為る", v1, &["vs"]),
        s("こさせる", "くる", v1, &["vk"]),
        s("来させる", "来る", v1, &["vk"]),
        s("來させる", "來る", v1, &["vk"]),
    ]);

    let mut short_causative = vec![s("さす", "る", &["v5ss"], v1)];
    short_causative.extend(GODAN_IRREALIS.iter().map(|(stem, ending)| {
        let conditions_in: &[&str] = if *stem == "さ" { &["v5ss"] } else { &["v5sp"] };
        s(&format!("{stem}す"), ending, conditions_in, v5)
    }));
    short_causative.extend([
        s("じさす", "ずる", &["v5ss"], &["vz"]),
        s("ぜさす", "ずる", &["v5ss"], &["vz"]),
        s("さす", "する", &["v5ss"], &["vs"]),
        s("為す", "為る", &["v5ss"], &["vs"]),
        s("こさす", "くる", &["v5ss"], &["vk"]),
        s("来さす", "来る", &["v5ss"], &["vk"]),
        s("來さす", "來る", &["v5ss"], &["vk"]),
    ]);

    let mut passive: Vec<Rule> = GODAN_IRREALIS
        .iter()
        .filter(|(_, ending)| *ending != "す")
        .map(|(stem, ending)| s(&format!("{stem}れる"), ending, v1, v5))
        .collect();
    passive.extend([
        s("される", "す", v1, &["v5d", "v5sp"]),
        s("じされる", "ずる", v1, &["vz"]),
        s("ぜされる", "ずる", v1, &["vz"]),
        s("される", "する", v1, &["vs"]),
        s("為れる", "為る", v1, &["vs"]),
        s("こられる", "くる", v1, &["vk"]),
        s("来られる", "来る", v1, &["vk"]),
        s("來られる", "來る", v1, &["vk"]),
    ]);

    let mut masu = vec![s("ます", "る", &["-ます"], v1)];
    masu.extend(GODAN_CONTINUATIVE.iter().map(|(stem, ending)| {
        let conditions_out: &[&str] = if *ending == "す" { &["v5d", "v5s"] } else { &["v5d"] };
        s(&format!("{stem}ます"), ending, &["-ます"], conditions_out)
    }));
    masu.extend(irregular_rules(&CONTINUATIVE_IRREGULARS, "ます", &["-ます"]));
    masu.push(s("くあります", "い", &["-ます"], adj_i));

    let mut potential = vec![s("れる", "る", v1, &["v1", "v5d"])];
    potential.extend(
        GODAN_HYPOTHETICAL[..8]
            .iter()
            .map(|(stem, ending)| s(&format!("{stem}る"), ending, v1, &["v5d"])),
    );
    potential.extend([
        s("できる", "する", v1, &["vs"]),
        s("出来る", "する", v1, &["vs"]),
        s("これる", "くる", v1, &["vk"]),
        s("来れる", "来る", v1, &["vk"]),
        s("來れる", "來る", v1, &["vk"]),
    ]);

    let mut volitional = vec![s("よう", "る", none, v1)];
    volitional.extend(godan_rules(&GODAN_VOLITIONAL, "う", none, v5));
    volitional.extend(irregular_rules(&IrregularStems { vz: "じ", vs: "し", vk: "こ" }, "よう", none));
    volitional.push(s("ましょう", "ます", none, &["-ます"]));
    volitional.push(s("かろう", "い", none, adj_i));

    let mut ta = with_leading(vec![s("かった", "い", &["-た"], adj_i)], euphonic_rules("た", "だ", &["-た"]));
    ta.extend([
        s("ました", "ます", &["-た"], &["-ます"]),
        s("でした", "", &["-た"], &["-ません"]),
        s("かった", "", &["-た"], &["-ません", "-ん"]),
    ]);

    let mut te = with_leading(vec![s("くて", "い", &["-て"], adj_i)], euphonic_rules("て", "で", &["-て"]));
    te.push(s("まして", "ます", none, &["-ます"]));

    let mut tara = with_leading(vec![s("かったら", "い", none, adj_i)], euphonic_rules("たら", "だら", none));
    tara.push(s("ましたら", "ます", none, &["-ます"]));

    let tari = with_leading(vec![s("かったり", "い", none, adj_i)], euphonic_rules("たり", "だり", none));

    IndexMap::from([
        transform("-ば", Some("1. Conditional form; shows that the previous stated condition's establishment is the condition for the latter stated condition to occur.\n2. Shows a trigger for a latter stated perception or judgment.\nUsage: Attach ば to the hypothetical form (仮定形) of verbs and i-adjectives."), ba),
        transform("-ゃ", Some("Contraction of -ば."), vec![
            s("けりゃ", "ければ", &["-ゃ"], &["-ば"]),
            s("きゃ", "ければ", &["-ゃ"], &["-ば"]),
            s("や", "えば", &["-ゃ"], &["-ば"]),
            s("きゃ", "けば", &["-ゃ"], &["-ば"]),
            s("ぎゃ", "げば", &["-ゃ"], &["-ば"]),
            s("しゃ", "せば", &["-ゃ"], &["-ば"]),
            s("ちゃ", "てば", &["-ゃ"], &["-ば"]),
            s("にゃ", "ねば", &["-ゃ"], &["-ば"]),
            s("びゃ", "べば", &["-ゃ"], &["-ば"]),
            s("みゃ", "めば", &["-ゃ"], &["-ば"]),
            s("りゃ", "れば", &["-ゃ"], &["-ば"]),
        ]),
        transform("-ちゃ", Some("Contraction of ～ては."), contracted_te_rules("ちゃ", "じゃ")),
        transform("-ちゃう", Some("Contraction of -しまう."), contracted_te_rules("ちゃう", "じゃう")),
        transform("-ちまう", Some("Contraction of -しまう."), contracted_te_rules("ちまう", "じまう")),
        transform("-しまう", Some("Shows a sense of regret or an action that has been completed."), vec![
            s("てしまう", "て", v5, &["-て"]),
            s("でしまう", "で", v5, &["-て"]),
        ]),
        transform("-なさい", Some("Polite imperative suffix."), continuative_rules("なさい", &["-なさい"])),
        transform("-そう", Some("Appearing that; looking like."), with_leading(vec![s("そう", "い", none, adj_i)], continuative_rules("そう", none))),
        transform("-すぎる", Some("Shows something \"is too...\" or someone is doing something \"too much\"."), with_leading(vec![s("すぎる", "い", v1, adj_i)], continuative_rules("すぎる", v1))),
        transform("-過ぎる", Some("Shows something \"is too...\" or someone is doing something \"too much\"."), with_leading(vec![s("過ぎる", "い", v1, adj_i)], continuative_rules("過ぎる", v1))),
        transform("-たい", Some("Expresses the feeling of desire or hope."), continuative_rules("たい", adj_i)),
        transform("-たら", Some("Conditional form; shows that the previous stated condition's establishment is the condition for the latter stated condition to occur."), tara),
        transform("-たり", Some("Shows two actions occurring back and forth, or a list of representative actions."), tari),
        transform("-て", Some("て-form. Connects clauses, gives requests, and builds progressive and perfect aspects."), te),
        transform("-ず", Some("Negative form of verbs; also works as a conjunctive form."), irrealis_rules("ず", none)),
        transform("-ぬ", Some("Negative form of verbs."), irrealis_rules("ぬ", none)),
        transform("-ん", Some("Negative form of verbs; a sound change of ぬ."), irrealis_rules("ん", &["-ん"])),
        transform("-んばかり", Some("Shows an action or condition is on the verge of occurring."), irrealis_rules("んばかり", none)),
        transform("-んとする", Some("Shows the speaker's will or intention."), irrealis_rules("んとする", &["vs"])),
        transform("-む", Some("Archaic volitional or conjectural form."), irrealis_rules("む", none)),
        transform("-ざる", Some("Negative form of verbs."), irrealis_rules("ざる", none)),
        transform("-ねば", Some("Shows a hypothetical negation; \"must\"."), irrealis_rules("ねば", &["-ば"])),
        transform("-く", Some("Adverbial form of i-adjectives."), vec![s("く", "い", &["-く"], adj_i)]),
        transform("causative", Some("Describes the intention to make someone do something."), causative),
        transform("short causative", Some("Contraction of the causative form."), short_causative),
        transform("imperative", Some("Gives a direct command."), imperative),
        transform("continuative", Some("Used to indicate actions that are (being) carried out."), continuative),
        transform("negative", Some("Negative form of verbs and i-adjectives."), negative),
        transform("-さ", Some("Nominalizes an i-adjective."), vec![s("さ", "い", none, adj_i)]),
        transform("passive", Some("Indicates an action received from an action performer."), passive),
        transform("-た", Some("Past tense; shows that an action has been completed."), ta),
        transform("-ます", Some("Polite conjugation of verbs and adjectives."), masu),
        transform("potential", Some("Indicates a state of being (naturally) capable of doing an action."), potential),
        transform("potential or passive", Some("Potential or passive form of ichidan verbs and irregular verbs."), vec![
            s("られる", "る", v1, v1),
            s("ざれる", "ずる", v1, &["vz"]),
            s("ぜられる", "ずる", v1, &["vz"]),
            s("せられる", "する", v1, &["vs"]),
            s("為られる", "為る", v1, &["vs"]),
            s("こられる", "くる", v1, &["vk"]),
            s("来られる", "来る", v1, &["vk"]),
            s("來られる", "來る", v1, &["vk"]),
        ]),
        transform("volitional", Some("Expresses speaker's will or intention."), volitional),
        transform("-まい", Some("Negative volition or conjecture."), vec![
            s("まい", "", none, &["v"]),
            s("まい", "る", none, v1),
            s("じまい", "ずる", none, &["vz"]),
            s("しまい", "する", none, &["vs"]),
            s("為まい", "為る", none, &["vs"]),
            s("こまい", "くる", none, &["vk"]),
            s("来まい", "来る", none, &["vk"]),
            s("來まい", "來る", none, &["vk"]),
            s("まい", "", none, &["-ます"]),
        ]),
        transform("-おく", Some("Doing something in advance or leaving something as it is."), vec![
            s("ておく", "て", v5, &["-て"]),
            s("でおく", "で", v5, &["-て"]),
            s("とく", "て", v5, &["-て"]),
            s("どく", "で", v5, &["-て"]),
            s("ないでおく", "ない", v5, adj_i),
            s("ないどく", "ない", v5, adj_i),
        ]),
        transform("-いる", Some("Progressive or perfect aspect."), vec![
            s("ている", "て", v1, &["-て"]),
            s("ておる", "て", v5, &["-て"]),
            s("てる", "て", &["v1p"], &["-て"]),
            s("でいる", "で", v1, &["-て"]),
            s("でおる", "で", v5, &["-て"]),
            s("でる", "で", &["v1p"], &["-て"]),
            s("とる", "て", v5, &["-て"]),
            s("ないでいる", "ない", v1, adj_i),
        ]),
        transform("-き", Some("Attributive form (連体形) of i-adjectives."), vec![s("き", "い", none, adj_i)]),
        transform("-げ", Some("Describes a person's appearance."), vec![
            s("げ", "い", none, adj_i),
            s("気", "い", none, adj_i),
        ]),
        transform("-がる", Some("Shows subject's feelings contrast with what is thought/known about them."), vec![s("がる", "い", v5, adj_i)]),
    ])
}

pub static JAPANESE_TRANSFORMS: LazyLock<LanguageTransformDescriptor> =
    LazyLock::new(|| LanguageTransformDescriptor {
        language: "ja".to_string(),
        conditions: conditions(),
        transforms: transforms(),
    });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::transformer::LanguageTransformer;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    enum HasTermReasonsError {
        #[error("no transformation from '{src}' to '{term}' with rule '{rule}'")]
        NoMatch {
            src: String,
            term: String,
            rule: String,
        },
    }

    static TRANSFORMER: LazyLock<LanguageTransformer> = LazyLock::new(|| {
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&JAPANESE_TRANSFORMS).unwrap();
        lt
    });

    /// Finds a path from `source` to `term` whose end state satisfies `rule`
    /// and whose reasons read `reasons`.
    fn has_term_reasons(
        source: &str,
        term: &str,
        rule: &str,
        reasons: &[&str],
    ) -> Result<(), HasTermReasonsError> {
        let expected_conditions = TRANSFORMER.get_condition_flags_from_single_condition_type(rule);
        let found = TRANSFORMER.transform(source).any(|result| {
            result.text == term
                && LanguageTransformer::conditions_match(result.conditions, expected_conditions)
                && result.inflection_rules() == reasons
        });
        if found {
            return Ok(());
        }
        Err(HasTermReasonsError::NoMatch {
            src: source.to_string(),
            term: term.to_string(),
            rule: rule.to_string(),
        })
    }

    #[test]
    fn descriptor_loads() {
        assert_eq!(JAPANESE_TRANSFORMS.conditions.len(), 22);
        assert_eq!(TRANSFORMER.get_condition_flags_from_single_condition_type("v5sp").count_ones(), 1);
    }

    #[test]
    fn adjective_paths() {
        #[rustfmt::skip]
        let cases: [(&str, &[&str]); 12] = [
            ("愛しそう", &["-そう"]),
            ("愛しすぎる", &["-すぎる"]),
            ("愛し過ぎる", &["-過ぎる"]),
            ("愛しかったら", &["-たら"]),
            ("愛しかったり", &["-たり"]),
            ("愛しくて", &["-て"]),
            ("愛しくない", &["negative"]),
            ("愛しさ", &["-さ"]),
            ("愛しかった", &["-た"]),
            ("愛しくありません", &["-ます", "negative"]),
            ("愛しくありませんでした", &["-ます", "negative", "-た"]),
            ("愛しげ", &["-げ"]),
        ];
        for (source, reasons) in cases {
            if let Err(e) = has_term_reasons(source, "愛しい", "adj-i", reasons) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn verb_paths() {
        #[rustfmt::skip]
        let cases: [(&str, &str, &str, &[&str]); 12] = [
            ("走った", "走る", "v5", &["-た"]),
            ("食べた", "食べる", "v1", &["-た"]),
            ("食べました", "食べる", "v1", &["-ます", "-た"]),
            ("食べませんでした", "食べる", "v1", &["-ます", "negative", "-た"]),
            ("書いて", "書く", "v5", &["-て"]),
            ("泳いだ", "泳ぐ", "v5", &["-た"]),
            ("読まない", "読む", "v5", &["negative"]),
            ("行った", "行く", "v5", &["-た"]),
            ("来させる", "来る", "vk", &["causative"]),
            ("勉強しよう", "勉強する", "vs", &["volitional"]),
            ("食べられる", "食べる", "v1", &["potential or passive"]),
            ("書ければ", "書く", "v5", &["potential", "-ば"]),
        ];
        for (source, term, rule, reasons) in cases {
            if let Err(e) = has_term_reasons(source, term, rule, reasons) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn dictionary_form_stays_first() {
        let first = TRANSFORMER.transform("食べる").next().unwrap();
        assert_eq!(first.text, "食べる");
        assert!(first.trace.is_empty());
    }
}
