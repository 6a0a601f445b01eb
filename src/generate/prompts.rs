//! Built-in sound prompts and clip durations

/// Default prompt list, one full preset's worth
pub const DEFAULT_PROMPTS: [&str; 64] = [
    "Bell alarm in the distance",
    "Droning low pitched hum",
    "Soft female speech whisper",
    "Electromagnetic interference",
    "Tube bells chiming softly",
    "Sine wave oscillating slowly",
    "CD skipping glitch sound",
    "Air raid siren far away",
    "Gentle wind through trees",
    "Metallic clank echoing",
    "Distant thunderstorm rumble",
    "High-pitched electronic beep",
    "Crackling fire embers",
    "Ocean waves crashing lightly",
    "Bird chirping in forest",
    "Mechanical whirring noise",
    "Echoing footsteps in hall",
    "Faint radio static noise",
    "Water dripping in cave",
    "Wind chimes in breeze",
    "Old clock ticking loudly",
    "Distant train whistle",
    "Rustling leaves in wind",
    "Low rumble of machinery",
    "Flickering fluorescent buzz",
    "Creaking wooden floor",
    "Subtle heartbeat pulse",
    "Chirping crickets at night",
    "Hiss of steam escaping",
    "Tapping on glass window",
    "Muffled voices through wall",
    "Slow piano note decay",
    "Gentle rain on rooftop",
    "Buzzing of electric current",
    "Faint owl hooting",
    "Rattling of loose chains",
    "Distant foghorn blast",
    "Soft guitar string pluck",
    "Whistling wind through gap",
    "Crunching gravel footsteps",
    "Low drone of airplane",
    "Ticking metronome sound",
    "Echoing drip in tunnel",
    "Faint laughter in distance",
    "Squeaking rusty hinge",
    "Humming of refrigerator",
    "Chiming of small bell",
    "Distant dog barking",
    "Rustling of paper pages",
    "Clatter of falling coins",
    "Whir of spinning fan",
    "Popping of bubble wrap",
    "Sizzling of frying pan",
    "Clicking of typewriter",
    "Distant car horn honk",
    "Soft thud of dropped book",
    "Hiss of aerosol spray",
    "Tinkle of breaking glass",
    "Rumble of rolling thunder",
    "Squeal of braking tires",
    "Chugging of old engine",
    "Patter of running feet",
    "Buzz of flying insect",
    "Clang of metal striking",
];

/// Default clip length in seconds, indexed by zone
pub const DEFAULT_DURATIONS: [f32; 8] = [10.0, 8.0, 12.0, 6.0, 10.0, 8.0, 12.0, 6.0];

pub fn default_prompts() -> Vec<String> {
    DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect()
}

pub fn default_durations() -> Vec<f32> {
    DEFAULT_DURATIONS.to_vec()
}
