use std::collections::BTreeSet;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown symptom identifier: {0}")]
pub struct UnknownSymptomId(pub String);

/// Generates the closed symptom enumeration from the classifier's column names.
macro_rules! symptom_ids {
    ($($variant:ident => $s:literal),+ $(,)?) => {
        /// Canonical symptom identifier: one column of the classifier's feature space.
        ///
        /// Variant order is the reference dataset's column order, so ordered
        /// collections of symptoms follow the feature layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum SymptomId {
            $($variant),+
        }

        impl SymptomId {
            /// Every identifier, in column order.
            pub const ALL: &'static [SymptomId] = &[$(SymptomId::$variant),+];

            /// Column name as it appears in the training data.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl FromStr for SymptomId {
            type Err = UnknownSymptomId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    _ => Err(UnknownSymptomId(s.to_string())),
                }
            }
        }
    };
}

// Column names are kept byte-for-byte, including the dataset's stray spaces.
symptom_ids! {
    Itching => "itching",
    SkinRash => "skin_rash",
    NodalSkinEruptions => "nodal_skin_eruptions",
    ContinuousSneezing => "continuous_sneezing",
    Shivering => "shivering",
    Chills => "chills",
    JointPain => "joint_pain",
    StomachPain => "stomach_pain",
    Acidity => "acidity",
    UlcersOnTongue => "ulcers_on_tongue",
    MuscleWasting => "muscle_wasting",
    Vomiting => "vomiting",
    BurningMicturition => "burning_micturition",
    SpottingUrination => "spotting_ urination",
    Fatigue => "fatigue",
    WeightGain => "weight_gain",
    Anxiety => "anxiety",
    ColdHandsAndFeets => "cold_hands_and_feets",
    MoodSwings => "mood_swings",
    WeightLoss => "weight_loss",
    Restlessness => "restlessness",
    Lethargy => "lethargy",
    PatchesInThroat => "patches_in_throat",
    IrregularSugarLevel => "irregular_sugar_level",
    Cough => "cough",
    HighFever => "high_fever",
    SunkenEyes => "sunken_eyes",
    Breathlessness => "breathlessness",
    Sweating => "sweating",
    Dehydration => "dehydration",
    Indigestion => "indigestion",
    Headache => "headache",
    YellowishSkin => "yellowish_skin",
    DarkUrine => "dark_urine",
    Nausea => "nausea",
    LossOfAppetite => "loss_of_appetite",
    PainBehindTheEyes => "pain_behind_the_eyes",
    BackPain => "back_pain",
    Constipation => "constipation",
    AbdominalPain => "abdominal_pain",
    Diarrhoea => "diarrhoea",
    MildFever => "mild_fever",
    YellowUrine => "yellow_urine",
    YellowingOfEyes => "yellowing_of_eyes",
    AcuteLiverFailure => "acute_liver_failure",
    FluidOverload => "fluid_overload",
    SwellingOfStomach => "swelling_of_stomach",
    SwelledLymphNodes => "swelled_lymph_nodes",
    Malaise => "malaise",
    BlurredAndDistortedVision => "blurred_and_distorted_vision",
    Phlegm => "phlegm",
    ThroatIrritation => "throat_irritation",
    RednessOfEyes => "redness_of_eyes",
    SinusPressure => "sinus_pressure",
    RunnyNose => "runny_nose",
    Congestion => "congestion",
    ChestPain => "chest_pain",
    WeaknessInLimbs => "weakness_in_limbs",
    FastHeartRate => "fast_heart_rate",
    PainDuringBowelMovements => "pain_during_bowel_movements",
    PainInAnalRegion => "pain_in_anal_region",
    BloodyStool => "bloody_stool",
    IrritationInAnus => "irritation_in_anus",
    NeckPain => "neck_pain",
    Dizziness => "dizziness",
    Cramps => "cramps",
    Bruising => "bruising",
    Obesity => "obesity",
    SwollenLegs => "swollen_legs",
    SwollenBloodVessels => "swollen_blood_vessels",
    PuffyFaceAndEyes => "puffy_face_and_eyes",
    EnlargedThyroid => "enlarged_thyroid",
    BrittleNails => "brittle_nails",
    SwollenExtremeties => "swollen_extremeties",
    ExcessiveHunger => "excessive_hunger",
    ExtraMaritalContacts => "extra_marital_contacts",
    DryingAndTinglingLips => "drying_and_tingling_lips",
    SlurredSpeech => "slurred_speech",
    KneePain => "knee_pain",
    HipJointPain => "hip_joint_pain",
    MuscleWeakness => "muscle_weakness",
    StiffNeck => "stiff_neck",
    SwellingJoints => "swelling_joints",
    MovementStiffness => "movement_stiffness",
    SpinningMovements => "spinning_movements",
    LossOfBalance => "loss_of_balance",
    Unsteadiness => "unsteadiness",
    WeaknessOfOneBodySide => "weakness_of_one_body_side",
    LossOfSmell => "loss_of_smell",
    BladderDiscomfort => "bladder_discomfort",
    FoulSmellOfUrine => "foul_smell_of urine",
    ContinuousFeelOfUrine => "continuous_feel_of_urine",
    PassageOfGases => "passage_of_gases",
    InternalItching => "internal_itching",
    ToxicLook => "toxic_look_(typhos)",
    Depression => "depression",
    Irritability => "irritability",
    MusclePain => "muscle_pain",
    AlteredSensorium => "altered_sensorium",
    RedSpotsOverBody => "red_spots_over_body",
    BellyPain => "belly_pain",
    AbnormalMenstruation => "abnormal_menstruation",
    DischromicPatches => "dischromic _patches",
    WateringFromEyes => "watering_from_eyes",
    IncreasedAppetite => "increased_appetite",
    Polyuria => "polyuria",
    FamilyHistory => "family_history",
    MucoidSputum => "mucoid_sputum",
    RustySputum => "rusty_sputum",
    LackOfConcentration => "lack_of_concentration",
    VisualDisturbances => "visual_disturbances",
    ReceivingBloodTransfusion => "receiving_blood_transfusion",
    ReceivingUnsterileInjections => "receiving_unsterile_injections",
    Coma => "coma",
    StomachBleeding => "stomach_bleeding",
    DistentionOfAbdomen => "distention_of_abdomen",
    HistoryOfAlcoholConsumption => "history_of_alcohol_consumption",
    FluidOverloadRepeat => "fluid_overload.1",
    BloodInSputum => "blood_in_sputum",
    ProminentVeinsOnCalf => "prominent_veins_on_calf",
    Palpitations => "palpitations",
    PainfulWalking => "painful_walking",
    PusFilledPimples => "pus_filled_pimples",
    Blackheads => "blackheads",
    Scurring => "scurring",
    SkinPeeling => "skin_peeling",
    SilverLikeDusting => "silver_like_dusting",
    SmallDentsInNails => "small_dents_in_nails",
    InflammatoryNails => "inflammatory_nails",
    Blister => "blister",
    RedSoreAroundNose => "red_sore_around_nose",
    YellowCrustOoze => "yellow_crust_ooze",
}

impl SymptomId {
    /// Human-readable label for reports: "chest_pain" -> "Chest Pain".
    pub fn display_label(&self) -> String {
        self.as_str()
            .replace('_', " ")
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for SymptomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SymptomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SymptomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SymptomSet
// ---------------------------------------------------------------------------

/// Accumulated symptoms of one conversation. Grows only; never shrinks.
///
/// Serializes as a JSON array of column names. Deserialization drops names
/// outside the enumeration instead of failing, so persisted sets written by
/// an older lexicon still load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomSet(BTreeSet<SymptomId>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full enumeration.
    pub fn all() -> Self {
        SymptomId::ALL.iter().copied().collect()
    }

    /// Build from raw column names, silently skipping unknown ones.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| SymptomId::from_str(name).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: SymptomId) -> bool {
        self.0.contains(&id)
    }

    pub fn contains_any(&self, ids: &[SymptomId]) -> bool {
        ids.iter().any(|id| self.0.contains(id))
    }

    pub fn contains_all(&self, ids: &[SymptomId]) -> bool {
        ids.iter().all(|id| self.0.contains(id))
    }

    /// Returns true if the symptom was not already present.
    pub fn insert(&mut self, id: SymptomId) -> bool {
        self.0.insert(id)
    }

    /// Union `other` into `self`. Returns how many symptoms were new.
    pub fn merge(&mut self, other: &SymptomSet) -> usize {
        let before = self.0.len();
        self.0.extend(other.0.iter().copied());
        self.0.len() - before
    }

    pub fn iter(&self) -> impl Iterator<Item = SymptomId> + '_ {
        self.0.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|id| id.as_str()).collect()
    }
}

impl FromIterator<SymptomId> for SymptomSet {
    fn from_iter<T: IntoIterator<Item = SymptomId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SymptomSet {
    type Item = &'a SymptomId;
    type IntoIter = std::collections::btree_set::Iter<'a, SymptomId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for SymptomSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for id in &self.0 {
            seq.serialize_element(id.as_str())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SymptomSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        Ok(Self::from_names(raw.iter().map(String::as_str)))
    }
}

// ---------------------------------------------------------------------------
// SymptomPattern
// ---------------------------------------------------------------------------

/// Guard over a symptom set used by the rule tables.
///
/// Matches when every `all_of` symptom is present, at least one `any_of`
/// symptom is present (an empty `any_of` is satisfied), and no `none_of`
/// symptom is present.
#[derive(Debug, Clone, Copy)]
pub struct SymptomPattern {
    pub all_of: &'static [SymptomId],
    pub any_of: &'static [SymptomId],
    pub none_of: &'static [SymptomId],
}

impl SymptomPattern {
    pub fn matches(&self, symptoms: &SymptomSet) -> bool {
        symptoms.contains_all(self.all_of)
            && (self.any_of.is_empty() || symptoms.contains_any(self.any_of))
            && !symptoms.contains_any(self.none_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_covers_all_classifier_columns() {
        assert_eq!(SymptomId::ALL.len(), 132);
        let unique: BTreeSet<&str> = SymptomId::ALL.iter().map(|id| id.as_str()).collect();
        assert_eq!(unique.len(), 132);
    }

    #[test]
    fn column_names_parse_back() {
        for id in SymptomId::ALL {
            assert_eq!(SymptomId::from_str(id.as_str()).unwrap(), *id);
        }
        assert_eq!(
            SymptomId::from_str("toxic_look_(typhos)").unwrap(),
            SymptomId::ToxicLook
        );
        assert!(SymptomId::from_str("migraine").is_err());
    }

    #[test]
    fn display_label_title_cases_words() {
        assert_eq!(SymptomId::ChestPain.display_label(), "Chest Pain");
        assert_eq!(SymptomId::SpottingUrination.display_label(), "Spotting Urination");
        assert_eq!(SymptomId::Cough.display_label(), "Cough");
    }

    #[test]
    fn merge_is_idempotent() {
        let extracted: SymptomSet = [SymptomId::ChestPain, SymptomId::Sweating]
            .into_iter()
            .collect();
        let mut once = SymptomSet::new();
        assert_eq!(once.merge(&extracted), 2);

        let mut twice = once.clone();
        assert_eq!(twice.merge(&extracted), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn deserialization_drops_unknown_names() {
        let set: SymptomSet =
            serde_json::from_str(r#"["chest_pain", "not_a_symptom", "sweating"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(SymptomId::ChestPain));
        assert!(set.contains(SymptomId::Sweating));
    }

    #[test]
    fn serializes_in_column_order() {
        let set: SymptomSet = [SymptomId::Sweating, SymptomId::Itching].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["itching","sweating"]"#);
    }

    #[test]
    fn pattern_requires_all_any_and_none() {
        let pattern = SymptomPattern {
            all_of: &[SymptomId::ChestPain],
            any_of: &[SymptomId::Breathlessness, SymptomId::Sweating],
            none_of: &[SymptomId::Cough],
        };
        let mut set: SymptomSet = [SymptomId::ChestPain].into_iter().collect();
        assert!(!pattern.matches(&set));
        set.insert(SymptomId::Sweating);
        assert!(pattern.matches(&set));
        set.insert(SymptomId::Cough);
        assert!(!pattern.matches(&set));
    }

    #[test]
    fn empty_any_of_is_satisfied() {
        let pattern = SymptomPattern {
            all_of: &[SymptomId::Headache],
            any_of: &[],
            none_of: &[],
        };
        let set: SymptomSet = [SymptomId::Headache].into_iter().collect();
        assert!(pattern.matches(&set));
    }
}
